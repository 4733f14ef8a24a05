//! File system walker for the ingestion input tree.
//!
//! Traverses directory trees in name order, skipping hidden entries,
//! glob-excluded paths and any directory the caller marks as off-limits
//! (the output tree when it lives inside the input). Files over the size
//! limit are not returned for processing but are reported separately so
//! callers can account for them. Errors such as permission denied are
//! logged and skipped.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{RagprepError, Result};

/// A file found during the walk that exceeds the size limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Result of a walk: files to process plus files rejected for size
#[derive(Debug, Default)]
pub struct CollectedFiles {
    pub files: Vec<PathBuf>,
    pub oversized: Vec<OversizedFile>,
}

impl CollectedFiles {
    /// Number of files the walk found, oversized ones included
    pub fn discovered(&self) -> usize {
        self.files.len() + self.oversized.len()
    }
}

/// File system walker with pattern-based filtering
pub struct FileWalker {
    /// Patterns to exclude (e.g., "**/drafts/**", "*.tmp.md")
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size in megabytes, 0 for no limit
    max_file_size_mb: usize,

    /// Maximum file size in bytes, `None` for no limit
    max_file_size_bytes: Option<u64>,

    /// Canonical directories never descended into
    excluded_dirs: Vec<PathBuf>,
}

impl FileWalker {
    /// Create a new file walker
    ///
    /// # Arguments
    ///
    /// * `exclude_patterns` - Glob patterns for paths to skip
    /// * `max_file_size_mb` - Maximum file size in megabytes (0 = no
    ///   limit)
    ///
    /// # Returns
    ///
    /// A new `FileWalker` instance or an error if a pattern is invalid
    pub fn new(exclude_patterns: Vec<String>, max_file_size_mb: usize) -> Result<Self> {
        let exclude = exclude_patterns
            .into_iter()
            .map(|p| {
                Pattern::new(&p).map_err(|e| {
                    RagprepError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let max_file_size_bytes = (max_file_size_mb > 0).then(|| (max_file_size_mb as u64) * 1024 * 1024);

        Ok(Self {
            exclude_patterns: exclude,
            max_file_size_mb,
            max_file_size_bytes,
            excluded_dirs: Vec::new(),
        })
    }

    /// Configured size limit in megabytes, 0 when unlimited
    pub fn max_file_size_mb(&self) -> usize {
        self.max_file_size_mb
    }

    /// Never descend into `dir`. Ignored when `dir` does not exist yet.
    pub fn exclude_dir(&mut self, dir: &Path) {
        if let Ok(canonical) = dir.canonicalize() {
            if !self.excluded_dirs.contains(&canonical) {
                self.excluded_dirs.push(canonical);
            }
        }
    }

    /// Collect all matching files from a directory
    ///
    /// Files come back sorted by name within each directory, so a run
    /// over an unchanged tree always sees the same order.
    pub fn collect_files(&self, root: &Path) -> Result<CollectedFiles> {
        let mut collected = CollectedFiles::default();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();

                    if self.is_excluded(path) {
                        continue;
                    }

                    if let (Some(limit), Ok(metadata)) = (self.max_file_size_bytes, entry.metadata()) {
                        if metadata.len() > limit {
                            tracing::info!(
                                "Skipping large file: {:?} ({} bytes)",
                                path,
                                metadata.len()
                            );
                            collected.oversized.push(OversizedFile {
                                path: path.to_path_buf(),
                                size_bytes: metadata.len(),
                            });
                            continue;
                        }
                    }

                    collected.files.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        Ok(collected)
    }

    /// Determine if a directory entry should be processed
    ///
    /// Never filters the root directory itself.
    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if is_hidden(entry) {
            return false;
        }

        if entry.file_type().is_dir() {
            if self.is_excluded(entry.path()) {
                tracing::debug!("Skipping excluded directory: {:?}", entry.path());
                return false;
            }
            if is_excluded_dir(entry.path(), &self.excluded_dirs) {
                tracing::debug!("Skipping output directory: {:?}", entry.path());
                return false;
            }
        }

        true
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(path_str) = path.to_str() else {
            return true;
        };

        self.exclude_patterns
            .iter()
            .any(|p| p.matches(path_str) || p.matches_path(path))
    }
}

/// Whether the entry's name starts with '.'
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Whether `dir` itself resolves to one of the canonical `excluded`
/// directories.
///
/// This is an equality test, not a prefix test: it is meant for a
/// `filter_entry` predicate, where rejecting the directory prunes its
/// whole subtree, so descendants never need checking.
pub fn is_excluded_dir(dir: &Path, excluded: &[PathBuf]) -> bool {
    if excluded.is_empty() {
        return false;
    }
    dir.canonicalize()
        .map(|canonical| excluded.iter().any(|e| *e == canonical))
        .unwrap_or(false)
}
