// Embedded record layout

use crate::common::{read_json, write_chunk_records, MockEmbedder};
use ragprep::core::embed::{EmbeddingPipeline, HashEmbedder};
use ragprep::RagprepError;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_embedded_record_keeps_fields_and_appends_vector() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 2);

    let pipeline = EmbeddingPipeline::new(Arc::new(MockEmbedder::new(3)), 20).unwrap();
    pipeline.embed_directory(&input, &output).unwrap();

    let path = output.join("raw_docs/doc/doc_txt_0001.json");
    let record = read_json(&path);
    let original = read_json(&input.join("raw_docs/doc/doc_txt_0001.json"));

    assert_eq!(record["content"], original["content"]);
    assert_eq!(record["metadata"], original["metadata"]);

    // "chunk number 1" has 14 characters
    let embedding = record["embedding"].as_array().unwrap();
    assert_eq!(embedding.len(), 3);
    assert!(embedding.iter().all(|v| v.as_f64() == Some(14.0)));

    let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["content", "metadata", "embedding"]);
}

#[test]
fn test_existing_embedding_field_is_replaced() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    let dir = input.join("raw_docs/doc");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("doc_txt_0000.json"),
        r#"{"embedding": [9.0], "content": "abc", "metadata": {"k": "v"}}"#,
    )
    .unwrap();

    let pipeline = EmbeddingPipeline::new(Arc::new(MockEmbedder::new(2)), 20).unwrap();
    pipeline.embed_directory(&input, &output).unwrap();

    let record = read_json(&output.join("raw_docs/doc/doc_txt_0000.json"));
    let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["content", "metadata", "embedding"]);
    assert_eq!(record["embedding"], serde_json::json!([3.0, 3.0]));
    assert_eq!(record["metadata"]["k"], "v");
}

#[test]
fn test_hash_embedder_rerun_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    write_chunk_records(&input.join("raw_docs/doc"), 4);

    let pipeline = EmbeddingPipeline::new(Arc::new(HashEmbedder::new(16).unwrap()), 3).unwrap();
    pipeline.embed_directory(&input, &output).unwrap();
    let path = output.join("raw_docs/doc/doc_txt_0002.json");
    let first = std::fs::read(&path).unwrap();

    pipeline.embed_directory(&input, &output).unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
    let record: Value = serde_json::from_slice(&second).unwrap();
    assert_eq!(record["embedding"].as_array().unwrap().len(), 16);
}

#[test]
fn test_input_tree_is_not_modified() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("processed");
    let output = temp.path().join("embeddings");
    let written = write_chunk_records(&input.join("raw_docs/doc"), 2);
    let before = std::fs::read(&written[0]).unwrap();

    let pipeline = EmbeddingPipeline::new(Arc::new(MockEmbedder::new(2)), 20).unwrap();
    pipeline.embed_directory(&input, &output).unwrap();

    assert_eq!(std::fs::read(&written[0]).unwrap(), before);
}

#[test]
fn test_output_equal_to_input_leaves_records_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("processed");
    let written = write_chunk_records(&root.join("docs/a"), 1);
    let before = std::fs::read(&written[0]).unwrap();

    let pipeline = EmbeddingPipeline::new(Arc::new(HashEmbedder::new(8).unwrap()), 20).unwrap();
    let result = pipeline.embed_directory(&root, &root);

    assert!(matches!(result, Err(RagprepError::InvalidPath(_))));
    assert_eq!(std::fs::read(&written[0]).unwrap(), before);
}
