//! Embedding stage: chunk records in, embedded records out.
//!
//! The pipeline only talks to an [`Embedder`]; which service (if any)
//! sits behind it is a configuration choice.

pub mod hashing;
pub mod openai;
pub mod pipeline;

pub use hashing::HashEmbedder;
pub use openai::OpenAiEmbedder;
pub use pipeline::{EmbeddingPipeline, DEFAULT_BATCH_SIZE, EMBEDDING_KEY};

use crate::core::error::Result;

/// Turns a batch of texts into vectors, one per text, in input order
pub trait Embedder: Send + Sync {
    /// Embed `texts`. Implementations return exactly one vector per
    /// input; the pipeline rejects anything else.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;

    /// Vector length, when known before the first call
    fn dimensions(&self) -> Option<usize> {
        None
    }
}
