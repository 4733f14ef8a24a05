//! Configuration management for ragprep.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! Command-line flags are applied on top by the CLI.

use crate::core::error::{RagprepError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Default locations of the three trees
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Raw documents to ingest
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Chunk records written by ingestion
    #[serde(default = "default_chunks_dir")]
    pub chunks_dir: PathBuf,

    /// Embedded records written by the embedding stage
    #[serde(default = "default_embeddings_dir")]
    pub embeddings_dir: PathBuf,
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Characters per chunk (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum file size in MB (0 disables the limit)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// File patterns to skip (glob syntax)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Requested vector length (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,

    /// Records per embedding call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient request failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

/// Service behind the embedding stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI-compatible HTTP API
    #[default]
    OpenAi,

    /// Offline feature hashing, no network access
    Hash,
}

impl EmbeddingProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingProvider::OpenAi => "openai",
            EmbeddingProvider::Hash => "hash",
        }
    }
}

impl fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProvider::OpenAi),
            "hash" => Ok(EmbeddingProvider::Hash),
            other => Err(format!(
                "unknown embedding provider '{other}' (expected 'openai' or 'hash')"
            )),
        }
    }
}

// Default value functions
fn default_input_dir() -> PathBuf {
    PathBuf::from("data/raw_docs")
}

fn default_chunks_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_embeddings_dir() -> PathBuf {
    PathBuf::from("data/embeddings")
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_max_file_size() -> usize {
    100
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_batch_size() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            chunks_dir: default_chunks_dir(),
            embeddings_dir: default_embeddings_dir(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_file_size_mb: default_max_file_size(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model: default_model(),
            base_url: default_base_url(),
            dimensions: None,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl IngestionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagprepError::ConfigError(
                "Chunk size must be non-zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(RagprepError::ConfigError(
                "Chunk overlap must be less than chunk size".to_string(),
            ));
        }

        Ok(())
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(RagprepError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(RagprepError::ConfigError(
                "Embedding timeout must be non-zero".to_string(),
            ));
        }

        if self.dimensions == Some(0) {
            return Err(RagprepError::ConfigError(
                "Embedding dimensions must be non-zero when set".to_string(),
            ));
        }

        if self.provider == EmbeddingProvider::OpenAi && self.model.trim().is_empty() {
            return Err(RagprepError::ConfigError(
                "Embedding model must be set for the openai provider".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RagprepError::ConfigError(format!("Failed to read config file {path:?}: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// This method uses XDG Base Directory specification for file locations.
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. RAGPREP_CONFIG env var
    /// 2. XDG config file (~/.config/ragprep/config.toml)
    /// 3. Legacy ./ragprep.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("RAGPREP_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("ragprep.toml").exists() {
                Self::from_file("ragprep.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Unparseable numeric values are ignored with a warning; an unknown
    /// provider name is an error.
    pub fn merge_env(&mut self) -> Result<()> {
        // Paths
        if let Ok(dir) = env::var("RAGPREP_INPUT_DIR") {
            self.paths.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("RAGPREP_CHUNKS_DIR") {
            self.paths.chunks_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("RAGPREP_EMBEDDINGS_DIR") {
            self.paths.embeddings_dir = PathBuf::from(dir);
        }

        // Ingestion
        if let Some(size) = env_number("RAGPREP_CHUNK_SIZE") {
            self.ingestion.chunk_size = size;
        }
        if let Some(overlap) = env_number("RAGPREP_CHUNK_OVERLAP") {
            self.ingestion.chunk_overlap = overlap;
        }
        if let Some(size) = env_number("RAGPREP_MAX_FILE_SIZE_MB") {
            self.ingestion.max_file_size_mb = size;
        }

        // Embedding
        if let Ok(provider) = env::var("RAGPREP_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider
                .parse()
                .map_err(|e| RagprepError::ConfigError(format!("RAGPREP_EMBEDDING_PROVIDER: {e}")))?;
        }
        if let Ok(model) = env::var("RAGPREP_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(base_url) = env::var("RAGPREP_EMBEDDING_BASE_URL") {
            self.embedding.base_url = base_url;
        }
        if let Some(batch_size) = env_number("RAGPREP_BATCH_SIZE") {
            self.embedding.batch_size = batch_size;
        }
        if let Some(timeout) = env_number("RAGPREP_EMBEDDING_TIMEOUT_SECS") {
            self.embedding.timeout_secs = timeout;
        }
        if let Some(retries) = env_number("RAGPREP_EMBEDDING_MAX_RETRIES") {
            self.embedding.max_retries = retries;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.ingestion.validate()?;
        self.embedding.validate()
    }

    /// Log configuration (the API key is never part of it)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Input dir: {:?}", self.paths.input_dir);
        tracing::info!("  Chunks dir: {:?}", self.paths.chunks_dir);
        tracing::info!("  Embeddings dir: {:?}", self.paths.embeddings_dir);
        tracing::info!("  Chunk size: {} chars", self.ingestion.chunk_size);
        tracing::info!("  Chunk overlap: {} chars", self.ingestion.chunk_overlap);
        tracing::info!("  Max file size: {} MB", self.ingestion.max_file_size_mb);
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.ingestion.exclude_patterns.len()
        );
        tracing::info!("  Embedding provider: {}", self.embedding.provider);
        tracing::info!("  Embedding model: {}", self.embedding.model);
        tracing::info!("  Batch size: {}", self.embedding.batch_size);
        tracing::info!("  Request timeout: {}s", self.embedding.timeout_secs);
    }
}

fn env_number<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}
