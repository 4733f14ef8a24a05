// Chunk record layout and chunk sequence invariants

use crate::common::{ingest_test_docs, long_paragraphs, read_json, record_files, TestDocs};
use serde_json::Value;

#[test]
fn test_chunk_indices_are_dense() {
    let docs = TestDocs::long_text(20);
    let output = docs.sibling("processed");

    let stats = ingest_test_docs(&docs.path(), &output, 500, 50);
    let files = record_files(&output.join("raw_docs/long"));

    assert!(files.len() > 1, "Expected several chunks, got {}", files.len());
    assert_eq!(stats.chunks_written, files.len());

    for (i, path) in files.iter().enumerate() {
        let expected_name = format!("long_txt_{i:04}.json");
        assert!(path.ends_with(&expected_name), "{path:?} != {expected_name}");

        let record = read_json(path);
        let metadata = &record["metadata"];
        assert_eq!(metadata["chunk_id"], Value::from(i));
        assert_eq!(metadata["chunk_index"], Value::from(i));
        assert_eq!(metadata["total_chunks"], Value::from(files.len()));
        assert_eq!(metadata["source_filename"], "long.txt");
    }
}

#[test]
fn test_chunks_respect_size_and_follow_document_order() {
    let docs = TestDocs::long_text(20);
    let output = docs.sibling("processed");
    let original = long_paragraphs(20);

    ingest_test_docs(&docs.path(), &output, 500, 50);

    let mut cursor = 0;
    for path in record_files(&output) {
        let record = read_json(&path);
        let content = record["content"].as_str().unwrap();

        assert!(content.chars().count() <= 500);
        assert_eq!(content, content.trim());

        // Each chunk starts at or after the previous one
        let found = original[cursor..]
            .find(content)
            .map(|offset| cursor + offset);
        let Some(start) = found else {
            panic!("Chunk from {path:?} not found in order");
        };
        cursor = start;
    }
}

#[test]
fn test_record_has_content_then_metadata() {
    let docs = TestDocs::with_files(&[("a.txt", "Short content here.")]);
    let output = docs.sibling("processed");

    ingest_test_docs(&docs.path(), &output, 1000, 200);
    let path = output.join("raw_docs/a/a_txt_0000.json");
    let text = std::fs::read_to_string(&path).unwrap();

    let content_at = text.find("\"content\"").unwrap();
    let metadata_at = text.find("\"metadata\"").unwrap();
    assert!(content_at < metadata_at);

    let record = read_json(&path);
    assert_eq!(record["content"], "Short content here.");
    assert!(record["metadata"]["source"]
        .as_str()
        .unwrap()
        .ends_with("a.txt"));
}

#[test]
fn test_short_content_is_one_chunk_for_every_type() {
    let docs = TestDocs::with_files(&[
        ("plain.txt", "  Short content here.  \n"),
        ("mark.md", "Short content here.\n"),
        ("mark2.markdown", "Short content here."),
        ("page.htm", "<html><body><p>Short content here.</p></body></html>"),
    ]);
    let output = docs.sibling("processed");

    let stats = ingest_test_docs(&docs.path(), &output, 1000, 200);

    assert_eq!(stats.files_processed, 4);
    assert_eq!(stats.chunks_written, 4);
    for path in record_files(&output) {
        let record = read_json(&path);
        assert_eq!(record["content"], "Short content here.", "{path:?}");
        assert_eq!(record["metadata"]["total_chunks"], 1);
    }
}

#[test]
fn test_unsplittable_text_gives_three_records() {
    let content = "x".repeat(2500);
    let docs = TestDocs::with_files(&[("blob.txt", content.as_str())]);
    let output = docs.sibling("processed");

    let stats = ingest_test_docs(&docs.path(), &output, 1000, 200);

    assert_eq!(stats.chunks_written, 3);
    let last = read_json(&output.join("raw_docs/blob/blob_txt_0002.json"));
    assert_eq!(last["content"].as_str().unwrap().len(), 900);
    assert_eq!(last["metadata"]["total_chunks"], 3);
}

#[test]
fn test_uppercase_extension_is_supported() {
    let docs = TestDocs::with_files(&[("SHOUT.TXT", "Loud text.")]);
    let output = docs.sibling("processed");

    let stats = ingest_test_docs(&docs.path(), &output, 1000, 200);

    assert_eq!(stats.files_processed, 1);
    assert!(output.join("raw_docs/SHOUT/SHOUT_TXT_0000.json").exists());
}

#[test]
fn test_dotted_filename_is_flattened() {
    let docs = TestDocs::with_files(&[("release.v2.txt", "Release notes.")]);
    let output = docs.sibling("processed");

    ingest_test_docs(&docs.path(), &output, 1000, 200);

    assert!(output
        .join("raw_docs/release.v2/release_v2_txt_0000.json")
        .exists());
}
