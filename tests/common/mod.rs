// Common test utilities and fixtures

pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test binaries but are used in others
#[allow(unused_imports)]
pub use fixtures::{long_paragraphs, write_chunk_records, TestDocs, INPUT_DIR_NAME};
#[allow(unused_imports)]
pub use helpers::{
    assert_valid_stats, create_test_services, ingest_test_docs, read_json, record_files,
    MockEmbedder,
};
