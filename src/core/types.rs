//! Core data types for ragprep.
//!
//! Documents, chunks and the on-disk record shapes, plus the
//! statistics both pipelines return.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::core::error::RagprepError;

/// Free-form metadata attached to documents, chunks and records
pub type Metadata = Map<String, Value>;

/// One unit of parsed document text (a whole file or a single PDF page)
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Extracted text
    pub content: String,

    /// Loader-supplied fields (`source`, `page`, `title`, ...)
    pub metadata: Metadata,
}

impl LoadedDocument {
    /// Create a unit whose metadata only carries the source path
    pub fn from_source(content: String, source: &Path) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(
            "source".to_string(),
            Value::String(source.display().to_string()),
        );
        Self { content, metadata }
    }
}

/// A bounded span of document text produced by a splitter
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The chunk text, trimmed of surrounding whitespace
    pub content: String,

    /// Metadata inherited from the loaded unit it came from
    pub metadata: Metadata,
}

/// A chunk as persisted by the chunk writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub content: String,
    pub metadata: Metadata,
}

/// A file, record or batch that was skipped during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    /// Offending file, or the containing directory for batch failures
    pub path: PathBuf,

    /// Error label from [`RagprepError::kind`]
    pub kind: String,

    /// Human-readable error message
    pub message: String,
}

impl Failure {
    pub fn new(path: impl Into<PathBuf>, error: &RagprepError) -> Self {
        Self {
            path: path.into(),
            kind: error.kind().to_string(),
            message: error.message(),
        }
    }
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Files returned by the walker
    pub files_discovered: usize,

    /// Files loaded, split and written without error
    pub files_processed: usize,

    /// Files skipped because of an error
    pub files_failed: usize,

    /// Chunk records written across all files
    pub chunks_written: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,

    /// True when the run stopped early on cancellation
    pub cancelled: bool,

    pub failures: Vec<Failure>,
}

/// Statistics from an embedding run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedStats {
    /// Directories that contained at least one record file
    pub directories_visited: usize,

    /// Embedding calls issued
    pub batches_submitted: usize,

    pub batches_succeeded: usize,

    pub batches_failed: usize,

    /// Embedded records written
    pub records_embedded: usize,

    /// Records not written (unreadable input, failed batch or failed write)
    pub records_failed: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,

    /// True when the run stopped early on cancellation
    pub cancelled: bool,

    pub failures: Vec<Failure>,
}
