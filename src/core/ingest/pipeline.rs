//! Ingestion pipeline orchestration.
//!
//! Coordinates the end-to-end ingestion workflow:
//! 1. Walk the input tree
//! 2. Pick a loader and splitter per file
//! 3. Load and split the file
//! 4. Write one record per chunk
//!
//! A failure in any step only skips the file it happened in.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::cancel::CancelFlag;
use crate::core::error::{RagprepError, Result};
use crate::core::ingest::{ChunkWriter, FileWalker};
use crate::core::loader::{extension_of, select_loader};
use crate::core::splitter::{select_splitter, RecursiveSplitter, GENERIC_SEPARATORS};
use crate::core::storage::{ensure_dir, ensure_distinct_dirs};
use crate::core::types::{Failure, IngestStats};

/// Orchestrates the ingestion pipeline
pub struct IngestionPipeline {
    walker: FileWalker,
    writer: ChunkWriter,
    chunk_size: usize,
    chunk_overlap: usize,
    cancel: CancelFlag,
}

impl IngestionPipeline {
    /// Create a new ingestion pipeline
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Root of the chunk record tree
    /// * `chunk_size` - Maximum chunk size in characters
    /// * `chunk_overlap` - Overlap between chunks in characters
    /// * `exclude_patterns` - Glob patterns for files to skip
    /// * `max_file_size_mb` - Maximum file size in megabytes (0 = no
    ///   limit)
    ///
    /// # Errors
    ///
    /// `ConfigError` for invalid chunk parameters or exclude patterns
    pub fn new(
        output_dir: impl Into<PathBuf>,
        chunk_size: usize,
        chunk_overlap: usize,
        exclude_patterns: Vec<String>,
        max_file_size_mb: usize,
    ) -> Result<Self> {
        RecursiveSplitter::new(chunk_size, chunk_overlap, &GENERIC_SEPARATORS)
            .map_err(|e| RagprepError::ConfigError(e.message()))?;
        let walker = FileWalker::new(exclude_patterns, max_file_size_mb)?;

        Ok(Self {
            walker,
            writer: ChunkWriter::new(output_dir),
            chunk_size,
            chunk_overlap,
            cancel: CancelFlag::new(),
        })
    }

    /// Stop between files once `flag` is cancelled
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.output_root()
    }

    /// Ingest every supported file under `input_dir`
    ///
    /// Errors for individual files are logged and recorded in the
    /// returned statistics; they never stop the run.
    ///
    /// # Errors
    ///
    /// `InvalidPath` if `input_dir` is not a directory or is the output
    /// directory itself, `WriteFailed` if
    /// the output root cannot be created.
    pub fn ingest_directory(&mut self, input_dir: &Path) -> Result<IngestStats> {
        let start = Instant::now();

        if !input_dir.is_dir() {
            return Err(RagprepError::InvalidPath(format!(
                "Input directory does not exist or is not a directory: {input_dir:?}"
            )));
        }
        ensure_dir(self.writer.output_root())?;
        ensure_distinct_dirs(input_dir, self.writer.output_root())?;
        self.walker.exclude_dir(self.writer.output_root());

        tracing::info!("Starting file collection from {:?}", input_dir);
        let collected = self.walker.collect_files(input_dir)?;
        tracing::info!(
            "Found {} files to ingest ({} over the size limit)",
            collected.files.len(),
            collected.oversized.len()
        );

        let mut stats = IngestStats {
            files_discovered: collected.discovered(),
            ..Default::default()
        };

        let limit_mb = self.walker.max_file_size_mb();
        for oversized in &collected.oversized {
            let err = RagprepError::LoadFailed(format!(
                "File exceeds {} MB limit ({} bytes)",
                limit_mb, oversized.size_bytes
            ));
            stats.files_failed += 1;
            stats.failures.push(Failure::new(&oversized.path, &err));
        }

        let files = &collected.files;
        for (idx, file_path) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Ingestion cancelled after {} of {} files", idx, files.len());
                stats.cancelled = true;
                break;
            }

            if idx % 100 == 0 && idx > 0 {
                tracing::info!("Progress: {}/{} files processed", idx, files.len());
            }

            match self.ingest_file(file_path) {
                Ok(chunk_count) => {
                    stats.files_processed += 1;
                    stats.chunks_written += chunk_count;
                    tracing::info!("Processed {:?} into {} chunks", file_path, chunk_count);
                }
                Err(e) => {
                    tracing::warn!("Failed to process {:?}: {}", file_path, e);
                    stats.files_failed += 1;
                    stats.failures.push(Failure::new(file_path, &e));
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Ingestion complete: {} files processed, {} skipped, \
             {} chunks written in {}ms",
            stats.files_processed,
            stats.files_failed,
            stats.chunks_written,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Load, split and write a single file, returning the record count
    pub fn ingest_file(&self, path: &Path) -> Result<usize> {
        let kind = select_loader(path)?;
        let splitter = select_splitter(&extension_of(path), self.chunk_size, self.chunk_overlap)?;

        let source_filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RagprepError::LoadFailed(format!("File name is not valid UTF-8: {path:?}")))?;

        let documents = kind.load(path)?;
        let chunks = splitter.split_documents(&documents);

        if chunks.is_empty() {
            tracing::debug!("No text extracted from {:?}", path);
        }

        let written = self.writer.write_chunks(&chunks, source_filename, path)?;
        Ok(written.len())
    }
}
