// Batch sizing, ordering and failure isolation in the embedding pipeline

use crate::common::{record_files, write_chunk_records, MockEmbedder};
use ragprep::core::cancel::CancelFlag;
use ragprep::core::embed::EmbeddingPipeline;
use std::sync::Arc;
use tempfile::TempDir;

fn pipeline_with(mock: &Arc<MockEmbedder>, batch_size: usize) -> EmbeddingPipeline {
    EmbeddingPipeline::new(mock.clone(), batch_size).unwrap()
}

#[test]
fn test_batches_are_sized_in_discovery_order() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 45);

    let mock = Arc::new(MockEmbedder::new(4));
    let stats = pipeline_with(&mock, 20)
        .embed_directory(&input, &output)
        .unwrap();

    assert_eq!(mock.call_sizes(), vec![20, 20, 5]);
    assert_eq!(stats.directories_visited, 1);
    assert_eq!(stats.batches_submitted, 3);
    assert_eq!(stats.batches_succeeded, 3);
    assert_eq!(stats.records_embedded, 45);
    assert_eq!(stats.records_failed, 0);
    assert_eq!(record_files(&output).len(), 45);
}

#[test]
fn test_failed_batch_is_skipped_and_run_continues() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 45);

    let mock = Arc::new(MockEmbedder::new(4).failing_on(1));
    let stats = pipeline_with(&mock, 20)
        .embed_directory(&input, &output)
        .unwrap();

    assert_eq!(mock.call_sizes(), vec![20, 20, 5]);
    assert_eq!(stats.batches_failed, 1);
    assert_eq!(stats.batches_succeeded, 2);
    assert_eq!(stats.records_embedded, 25);
    assert_eq!(stats.records_failed, 20);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].kind, "embedding_failed");
    assert!(stats.failures[0].message.starts_with("batch 2:"));

    let out_dir = output.join("raw_docs/doc");
    assert!(out_dir.join("doc_txt_0019.json").exists());
    for i in 20..40 {
        assert!(!out_dir.join(format!("doc_txt_{i:04}.json")).exists());
    }
    assert!(out_dir.join("doc_txt_0040.json").exists());
    assert_eq!(record_files(&output).len(), 25);
}

#[test]
fn test_vector_count_mismatch_fails_batch() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 5);

    let mock = Arc::new(MockEmbedder::new(4).short_on(0));
    let stats = pipeline_with(&mock, 10)
        .embed_directory(&input, &output)
        .unwrap();

    assert_eq!(stats.batches_failed, 1);
    assert_eq!(stats.records_embedded, 0);
    assert!(record_files(&output).is_empty());
}

#[test]
fn test_batches_never_span_directories() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/alpha"), 3);
    write_chunk_records(&input.join("raw_docs/beta"), 4);

    let mock = Arc::new(MockEmbedder::new(2));
    let stats = pipeline_with(&mock, 20)
        .embed_directory(&input, &output)
        .unwrap();

    assert_eq!(mock.call_sizes(), vec![3, 4]);
    assert_eq!(stats.directories_visited, 2);
    assert_eq!(stats.records_embedded, 7);
}

#[test]
fn test_unreadable_record_is_isolated() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    let dir = input.join("raw_docs/doc");
    write_chunk_records(&dir, 3);
    std::fs::write(dir.join("doc_txt_0003.json"), "{ not json").unwrap();
    std::fs::write(dir.join("doc_txt_0004.json"), r#"{"metadata": {}}"#).unwrap();

    let mock = Arc::new(MockEmbedder::new(2));
    let stats = pipeline_with(&mock, 20)
        .embed_directory(&input, &output)
        .unwrap();

    assert_eq!(mock.call_sizes(), vec![3]);
    assert_eq!(stats.records_embedded, 3);
    assert_eq!(stats.records_failed, 2);
    assert!(stats.failures.iter().all(|f| f.kind == "load_failed"));
}

#[test]
fn test_empty_tree_makes_no_calls() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    std::fs::create_dir_all(input.join("raw_docs/empty")).unwrap();
    let output = temp.path().join("embeddings");

    let mock = Arc::new(MockEmbedder::new(2));
    let stats = pipeline_with(&mock, 20)
        .embed_directory(&input, &output)
        .unwrap();

    assert!(mock.call_sizes().is_empty());
    assert_eq!(stats.directories_visited, 0);
    assert!(!output.join("raw_docs/empty").exists());
}

#[test]
fn test_cancelled_run_submits_nothing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 5);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let mock = Arc::new(MockEmbedder::new(2));
    let stats = pipeline_with(&mock, 2)
        .with_cancel_flag(cancel)
        .embed_directory(&input, &output)
        .unwrap();

    assert!(stats.cancelled);
    assert_eq!(stats.batches_submitted, 0);
    assert!(record_files(&output).is_empty());
}
