//! Chunk record writer.
//!
//! Each chunk of a source file becomes one pretty-printed JSON record:
//!
//! ```text
//! <output_root>/<parent dir name>/<file stem>/<file_name_with_underscores>_<NNNN>.json
//! ```
//!
//! Record contents depend only on the chunk list and the source path, so
//! re-ingesting an unchanged file rewrites byte-identical records.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::core::error::{RagprepError, Result};
use crate::core::storage::{ensure_dir, write_atomic};
use crate::core::types::{Chunk, ChunkRecord};

/// Metadata keys the writer always sets, overriding loader fields
pub const RESERVED_METADATA_KEYS: [&str; 4] =
    ["chunk_id", "chunk_index", "total_chunks", "source_filename"];

/// Writes chunk records under an output root
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    output_root: PathBuf,
}

impl ChunkWriter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory holding the records of one source file
    pub fn document_dir(&self, source_filename: &str, source_path: &Path) -> PathBuf {
        let parent_name = source_path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = Path::new(source_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_filename.to_string());

        self.output_root.join(parent_name).join(stem)
    }

    /// Write one record per chunk, in order.
    ///
    /// Returns the written paths. An empty chunk list writes nothing
    /// and creates no directories.
    pub fn write_chunks(
        &self,
        chunks: &[Chunk],
        source_filename: &str,
        source_path: &Path,
    ) -> Result<Vec<PathBuf>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.document_dir(source_filename, source_path);
        ensure_dir(&dir)?;

        let total = chunks.len();
        let mut written = Vec::with_capacity(total);

        for (index, chunk) in chunks.iter().enumerate() {
            let record = build_record(chunk, index, total, source_filename);
            let path = dir.join(record_file_name(source_filename, index));
            let json = serde_json::to_string_pretty(&record).map_err(|e| {
                RagprepError::WriteFailed(format!("Failed to serialize {path:?}: {e}"))
            })?;

            write_atomic(&path, json.as_bytes())?;
            written.push(path);
        }

        tracing::debug!("Wrote {} records to {:?}", written.len(), dir);
        Ok(written)
    }
}

/// `report.v2.pdf`, 7 → `report_v2_pdf_0007.json`
pub fn record_file_name(source_filename: &str, index: usize) -> String {
    format!("{}_{:04}.json", source_filename.replace('.', "_"), index)
}

/// Chunk metadata merged with the four reserved keys
pub fn build_record(chunk: &Chunk, index: usize, total: usize, source_filename: &str) -> ChunkRecord {
    let mut metadata = chunk.metadata.clone();
    let reserved = [
        Value::from(index),
        Value::from(index),
        Value::from(total),
        Value::from(source_filename),
    ];

    for (key, value) in RESERVED_METADATA_KEYS.into_iter().zip(reserved) {
        if let Some(previous) = metadata.insert(key.to_string(), value) {
            tracing::debug!(
                "Loader field '{}' ({}) overridden in {} chunk {}",
                key,
                previous,
                source_filename,
                index
            );
        }
    }

    ChunkRecord {
        content: chunk.content.clone(),
        metadata,
    }
}
