// Test helper functions

use ragprep::core::config::Config;
use ragprep::core::embed::Embedder;
use ragprep::core::error::{RagprepError, Result};
use ragprep::core::ingest::IngestionPipeline;
use ragprep::core::services::Services;
use ragprep::core::types::IngestStats;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Create test services whose default paths live in a temporary directory
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services() -> Services {
    let mut config = Config::default();

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    config.paths.input_dir = temp_dir.path().join("raw");
    config.paths.chunks_dir = temp_dir.path().join("processed");
    config.paths.embeddings_dir = temp_dir.path().join("embeddings");
    // Keep temp dir alive for duration of test
    std::mem::forget(temp_dir);

    Services::new(config)
}

/// Assert that ingest stats are consistent
#[allow(dead_code)] // Used in integration tests
pub fn assert_valid_stats(stats: &IngestStats) {
    assert!(
        stats.files_processed > 0,
        "Expected files_processed > 0, got {}",
        stats.files_processed
    );
    assert!(
        stats.chunks_written >= stats.files_processed,
        "Expected chunks_written ({}) >= files_processed ({})",
        stats.chunks_written,
        stats.files_processed
    );
    assert_eq!(
        stats.files_processed + stats.files_failed,
        stats.files_discovered,
        "Every discovered file is either processed or failed"
    );
    assert_eq!(stats.failures.len(), stats.files_failed);
}

/// Ingest `input` into `output` with the given chunk parameters
#[allow(dead_code)] // Used in integration tests
pub fn ingest_test_docs(
    input: &Path,
    output: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> IngestStats {
    let mut pipeline = IngestionPipeline::new(output, chunk_size, chunk_overlap, vec![], 10)
        .expect("Failed to create pipeline");
    pipeline
        .ingest_directory(input)
        .expect("Failed to ingest directory")
}

/// Every `.json` file under `root`, sorted by path
#[allow(dead_code)]
pub fn record_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Parse a JSON file
#[allow(dead_code)]
pub fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("Failed to read record");
    serde_json::from_str(&text).expect("Record is not valid JSON")
}

/// Embedder that records batch sizes and returns constant vectors
///
/// Each vector is `dimensions` copies of the text's character count,
/// so tests can tell which record got which vector.
#[allow(dead_code)]
pub struct MockEmbedder {
    pub dimensions: usize,
    pub calls: Mutex<Vec<usize>>,
    /// Zero-based call index that returns an error
    pub fail_on_call: Option<usize>,
    /// Zero-based call index that returns one vector too few
    pub short_on_call: Option<usize>,
}

#[allow(dead_code)]
impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Mutex::new(Vec::new()),
            fail_on_call: None,
            short_on_call: None,
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn short_on(mut self, call: usize) -> Self {
        self.short_on_call = Some(call);
        self
    }

    /// Batch sizes of every call so far
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl Embedder for MockEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(texts.len());
            calls.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(RagprepError::EmbeddingFailed(format!(
                "mock failure on call {call}"
            )));
        }

        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| vec![t.chars().count() as f32; self.dimensions])
            .collect();
        if self.short_on_call == Some(call) {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
