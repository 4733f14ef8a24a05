//! Error types and error handling for ragprep.
//!
//! Every failure that can happen while ingesting a file or embedding a
//! batch maps onto one variant here. The pipelines recover per file or
//! per batch and record the variant's [`RagprepError::kind`] label in
//! their run statistics; only `InvalidPath` and `ConfigError` end a run.

use thiserror::Error;

/// Result type alias for ragprep operations
pub type Result<T> = std::result::Result<T, RagprepError>;

/// Main error type for ragprep
#[derive(Error, Debug)]
pub enum RagprepError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("Split failed: {0}")]
    SplitFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Embedding service failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl RagprepError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable snake_case label used in run statistics and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            RagprepError::UnsupportedFileType(_) => "unsupported_file_type",
            RagprepError::LoadFailed(_) => "load_failed",
            RagprepError::SplitFailed(_) => "split_failed",
            RagprepError::WriteFailed(_) => "write_failed",
            RagprepError::EmbeddingFailed(_) => "embedding_failed",
            RagprepError::InvalidPath(_) => "invalid_path",
            RagprepError::ConfigError(_) => "config_error",
            RagprepError::IoError(_) => "io_error",
            RagprepError::SerdeError(_) => "serialization_error",
            RagprepError::TomlError(_) => "toml_error",
        }
    }

    /// Check if this error ends a whole run rather than one file or batch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RagprepError::InvalidPath(_) | RagprepError::ConfigError(_) | RagprepError::TomlError(_)
        )
    }
}
