//! Unified service container for ragprep
//!
//! Holds the loaded configuration and builds pipelines from it.

use crate::core::config::{Config, EmbeddingConfig, EmbeddingProvider, IngestionConfig};
use crate::core::embed::{hashing, Embedder, EmbeddingPipeline, HashEmbedder, OpenAiEmbedder};
use crate::core::error::{RagprepError, Result};
use crate::core::ingest::IngestionPipeline;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create an IngestionPipeline with run-specific settings
    ///
    /// `ingestion` is usually the configured section with command-line
    /// overrides applied.
    pub fn create_ingestion_pipeline(
        &self,
        output_dir: &Path,
        ingestion: &IngestionConfig,
    ) -> Result<IngestionPipeline> {
        ingestion.validate()?;
        IngestionPipeline::new(
            output_dir,
            ingestion.chunk_size,
            ingestion.chunk_overlap,
            ingestion.exclude_patterns.clone(),
            ingestion.max_file_size_mb,
        )
    }

    /// Build the embedder selected by `embedding.provider`
    ///
    /// The OpenAI provider owns a blocking HTTP client, so call this
    /// off the async runtime (e.g. inside `spawn_blocking`).
    pub fn create_embedder(
        &self,
        embedding: &EmbeddingConfig,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn Embedder>> {
        embedding.validate()?;

        match embedding.provider {
            EmbeddingProvider::OpenAi => {
                let api_key = api_key.ok_or_else(|| {
                    RagprepError::ConfigError(
                        "Missing OpenAI API key (set OPENAI_API_KEY or pass --api-key)"
                            .to_string(),
                    )
                })?;
                let embedder = OpenAiEmbedder::new(
                    api_key,
                    &embedding.base_url,
                    &embedding.model,
                    embedding.dimensions,
                    Duration::from_secs(embedding.timeout_secs),
                    embedding.max_retries,
                )?;
                Ok(Arc::new(embedder))
            }
            EmbeddingProvider::Hash => {
                let dimensions = embedding.dimensions.unwrap_or(hashing::DEFAULT_DIMENSIONS);
                Ok(Arc::new(HashEmbedder::new(dimensions)?))
            }
        }
    }

    /// Create an EmbeddingPipeline with run-specific settings
    pub fn create_embedding_pipeline(
        &self,
        embedding: &EmbeddingConfig,
        api_key: Option<&str>,
    ) -> Result<EmbeddingPipeline> {
        let embedder = self.create_embedder(embedding, api_key)?;
        EmbeddingPipeline::new(embedder, embedding.batch_size)
    }
}
