//! Document ingestion: input tree in, chunk records out.

pub mod pipeline;
pub mod walker;
pub mod writer;

pub use pipeline::IngestionPipeline;
pub use walker::{CollectedFiles, FileWalker, OversizedFile};
pub use writer::{ChunkWriter, RESERVED_METADATA_KEYS};
