//! Batch embedding pipeline.
//!
//! Walks a chunk record tree directory by directory, sends the records
//! of each directory to the embedder in fixed-size batches and writes
//! every record back out, with its vector attached, at the same relative
//! path under the output root.
//!
//! Failure handling is per unit of work:
//! - an unreadable record is left out of its batch
//! - a failed embedding call drops the whole batch, nothing is written
//! - a failed write only loses that one record

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

use crate::core::cancel::CancelFlag;
use crate::core::embed::Embedder;
use crate::core::error::{RagprepError, Result};
use crate::core::ingest::walker::{is_excluded_dir, is_hidden};
use crate::core::storage::{ensure_dir, ensure_distinct_dirs, write_atomic};
use crate::core::types::{EmbedStats, Failure, Metadata};

pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Field added to every embedded record
pub const EMBEDDING_KEY: &str = "embedding";

pub struct EmbeddingPipeline {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    cancel: CancelFlag,
}

impl EmbeddingPipeline {
    /// # Errors
    ///
    /// `ConfigError` if `batch_size` is 0.
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(RagprepError::ConfigError(
                "batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            batch_size,
            cancel: CancelFlag::new(),
        })
    }

    /// Stop between batches once `flag` is cancelled
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Embed every record under `input_root` into `output_root`
    ///
    /// # Errors
    ///
    /// `InvalidPath` if `input_root` is not a directory or is the same
    /// directory as `output_root`, `WriteFailed`
    /// if `output_root` cannot be created. Everything else is recorded
    /// in the returned statistics.
    pub fn embed_directory(&self, input_root: &Path, output_root: &Path) -> Result<EmbedStats> {
        let start = Instant::now();

        if !input_root.is_dir() {
            return Err(RagprepError::InvalidPath(format!(
                "Chunks directory does not exist or is not a directory: {input_root:?}"
            )));
        }
        ensure_dir(output_root)?;
        ensure_distinct_dirs(input_root, output_root)?;
        let excluded: Vec<PathBuf> = output_root.canonicalize().into_iter().collect();

        tracing::info!(
            "Embedding records from {:?} into {:?} with model '{}'",
            input_root,
            output_root,
            self.embedder.model_name()
        );

        let mut stats = EmbedStats::default();

        let walker = WalkDir::new(input_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(is_hidden(e) || (e.file_type().is_dir() && is_excluded_dir(e.path(), &excluded)))
            });

        'walk: for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            let files = match collect_record_files(dir) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("Failed to list {:?}: {}", dir, e);
                    stats.failures.push(Failure::new(dir, &e));
                    continue;
                }
            };
            if files.is_empty() {
                continue;
            }

            let Ok(relative) = dir.strip_prefix(input_root) else {
                continue;
            };
            let out_dir = output_root.join(relative);
            if let Err(e) = ensure_dir(&out_dir) {
                tracing::error!("Skipping {:?}: {}", dir, e);
                stats.records_failed += files.len();
                stats.failures.push(Failure::new(dir, &e));
                continue;
            }

            stats.directories_visited += 1;
            tracing::info!("Processing {} records in {:?}", files.len(), dir);

            for (batch_index, batch) in files.chunks(self.batch_size).enumerate() {
                if self.cancel.is_cancelled() {
                    tracing::warn!("Embedding cancelled in {:?} before batch {}", dir, batch_index + 1);
                    stats.cancelled = true;
                    break 'walk;
                }
                self.process_batch(dir, &out_dir, batch_index + 1, batch, &mut stats);
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Embedding complete: {} records embedded, {} failed, \
             {}/{} batches succeeded in {}ms",
            stats.records_embedded,
            stats.records_failed,
            stats.batches_succeeded,
            stats.batches_submitted,
            stats.duration_ms
        );

        Ok(stats)
    }

    fn process_batch(
        &self,
        dir: &Path,
        out_dir: &Path,
        batch_number: usize,
        batch: &[PathBuf],
        stats: &mut EmbedStats,
    ) {
        let mut records: Vec<(&PathBuf, Metadata)> = Vec::with_capacity(batch.len());
        let mut texts = Vec::with_capacity(batch.len());

        for path in batch {
            match read_record(path) {
                Ok((fields, content)) => {
                    texts.push(content);
                    records.push((path, fields));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable record {:?}: {}", path, e);
                    stats.records_failed += 1;
                    stats.failures.push(Failure::new(path, &e));
                }
            }
        }
        if records.is_empty() {
            return;
        }

        stats.batches_submitted += 1;
        let vectors = match self
            .embedder
            .embed_batch(&texts)
            .and_then(|vectors| validate_vectors(vectors, texts.len()))
        {
            Ok(vectors) => vectors,
            Err(e) => {
                tracing::error!("Error processing batch {} in {:?}: {}", batch_number, dir, e);
                stats.batches_failed += 1;
                stats.records_failed += records.len();
                stats.failures.push(Failure {
                    path: dir.to_path_buf(),
                    kind: e.kind().to_string(),
                    message: format!("batch {batch_number}: {}", e.message()),
                });
                return;
            }
        };
        stats.batches_succeeded += 1;

        for ((path, fields), vector) in records.iter().zip(&vectors) {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let out_path = out_dir.join(file_name);

            match write_embedded(&out_path, fields, vector) {
                Ok(()) => stats.records_embedded += 1,
                Err(e) => {
                    tracing::warn!("Failed to write {:?}: {}", out_path, e);
                    stats.records_failed += 1;
                    stats.failures.push(Failure::new(&out_path, &e));
                }
            }
        }

        tracing::debug!("Processed batch {} in {:?}", batch_number, dir);
    }
}

/// Record files directly inside `dir`, sorted by name
fn collect_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(".json") && !name.starts_with('.') {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse a record, returning all of its fields and its `content`
fn read_record(path: &Path) -> Result<(Metadata, String)> {
    let bytes = fs::read(path)
        .map_err(|e| RagprepError::LoadFailed(format!("Failed to read {path:?}: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| RagprepError::LoadFailed(format!("Invalid JSON in {path:?}: {e}")))?;

    let Value::Object(fields) = value else {
        return Err(RagprepError::LoadFailed(format!(
            "Record {path:?} is not a JSON object"
        )));
    };
    let content = fields
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RagprepError::LoadFailed(format!("Record {path:?} has no string 'content' field"))
        })?
        .to_string();

    Ok((fields, content))
}

/// One vector per text, all the same length
fn validate_vectors(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(RagprepError::EmbeddingFailed(format!(
            "Expected {expected} vectors, got {}",
            vectors.len()
        )));
    }
    if let Some(first) = vectors.first() {
        let dims = first.len();
        if let Some(bad) = vectors.iter().position(|v| v.len() != dims) {
            return Err(RagprepError::EmbeddingFailed(format!(
                "Vector {bad} has {} dimensions, expected {dims}",
                vectors[bad].len()
            )));
        }
    }
    Ok(vectors)
}

fn write_embedded(path: &Path, fields: &Metadata, embedding: &[f32]) -> Result<()> {
    let json = serde_json::to_vec(&EmbeddedRecord { fields, embedding })?;
    write_atomic(path, &json)
}

/// Input record fields in their original order, then `embedding`
struct EmbeddedRecord<'a> {
    fields: &'a Metadata,
    embedding: &'a [f32],
}

impl Serialize for EmbeddedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.fields.iter().filter(|(k, _)| *k != EMBEDDING_KEY) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(EMBEDDING_KEY, self.embedding)?;
        map.end()
    }
}
