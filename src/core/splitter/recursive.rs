//! Recursive character splitting.
//!
//! Splits text at the most structural separator that occurs in it,
//! merges the resulting pieces back into windows of at most
//! `chunk_size` characters with `chunk_overlap` characters carried
//! between neighbours, and recurses with finer separators into any
//! piece that is still too large.
//!
//! All lengths are measured in **characters**, not bytes, and every cut
//! falls on a character boundary, so multi-byte UTF-8 input never
//! panics.
//!
//! # Example
//!
//! ```
//! use ragprep::core::splitter::{RecursiveSplitter, GENERIC_SEPARATORS};
//!
//! let splitter = RecursiveSplitter::new(10, 2, &GENERIC_SEPARATORS).unwrap();
//! let chunks = splitter.split_text("Hello 👋 World 🌍 and friends");
//!
//! for chunk in &chunks {
//!     assert!(chunk.chars().count() <= 10);
//! }
//! ```

use std::collections::VecDeque;

use crate::core::error::{RagprepError, Result};
use crate::core::splitter::separators::Separator;
use crate::core::types::{Chunk, LoadedDocument};

/// Splitter that prefers structural boundaries over arbitrary cuts
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    /// Maximum characters per chunk
    chunk_size: usize,

    /// Characters carried over between consecutive chunks
    chunk_overlap: usize,

    separators: &'static [Separator],
}

impl RecursiveSplitter {
    /// Create a splitter over the given separator set.
    ///
    /// # Errors
    ///
    /// `SplitFailed` if `chunk_size` is 0 or `chunk_overlap >=
    /// chunk_size`.
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &'static [Separator],
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagprepError::SplitFailed(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagprepError::SplitFailed(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split one text into trimmed, non-empty chunks in document order
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_recursive(text, self.separators, &mut chunks);
        chunks
    }

    /// Split every unit of a file, in order, into one chunk list.
    ///
    /// Each chunk carries a copy of the metadata of the unit it came
    /// from.
    pub fn split_documents(&self, documents: &[LoadedDocument]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .map(|content| Chunk {
                        content,
                        metadata: doc.metadata.clone(),
                    })
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[Separator], out: &mut Vec<String>) {
        let Some(index) = separators.iter().position(|s| s.occurs_in(text)) else {
            push_trimmed(out, text);
            return;
        };
        let separator = &separators[index];
        let finer = &separators[index + 1..];

        let mut pending: Vec<&str> = Vec::new();
        for piece in separator.split(text) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                self.merge_pieces(&pending, out);
                pending.clear();
            }

            if finer.is_empty() {
                // Atomic piece larger than the limit: emitted as-is
                push_trimmed(out, piece);
            } else {
                self.split_recursive(piece, finer, out);
            }
        }

        if !pending.is_empty() {
            self.merge_pieces(&pending, out);
        }
    }

    /// Merge small pieces into windows of at most `chunk_size`
    /// characters, keeping up to `chunk_overlap` characters of the
    /// previous window at the start of the next.
    fn merge_pieces(&self, pieces: &[&str], out: &mut Vec<String>) {
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_window(out, &window);

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if !window.is_empty() {
            push_window(out, &window);
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn push_window(out: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    push_trimmed(out, &joined);
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
