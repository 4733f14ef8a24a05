//! Text splitting.
//!
//! Picks a separator set from a file's extension and builds a
//! [`RecursiveSplitter`] over it:
//!
//! - Markdown: headings, code fences and rules first
//! - HTML: block-level tags first
//! - everything else: paragraph, line, sentence, word, character

pub mod recursive;
pub mod separators;

pub use recursive::RecursiveSplitter;
pub use separators::{Separator, GENERIC_SEPARATORS, HTML_SEPARATORS, MARKDOWN_SEPARATORS};

use crate::core::error::Result;
use crate::core::loader::normalize_extension;

/// Separator family chosen for a file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitterKind {
    Markdown,
    Html,
    Generic,
}

impl SplitterKind {
    /// Map an extension (with or without the dot, any case) to a kind
    pub fn for_extension(extension: &str) -> Self {
        match normalize_extension(extension).as_str() {
            "md" | "markdown" => SplitterKind::Markdown,
            "html" | "htm" => SplitterKind::Html,
            _ => SplitterKind::Generic,
        }
    }

    pub fn separators(self) -> &'static [Separator] {
        match self {
            SplitterKind::Markdown => &MARKDOWN_SEPARATORS,
            SplitterKind::Html => &HTML_SEPARATORS,
            SplitterKind::Generic => &GENERIC_SEPARATORS,
        }
    }
}

/// Build the splitter for a file extension.
///
/// # Errors
///
/// `SplitFailed` when `chunk_size` is 0 or `chunk_overlap` is not
/// smaller than `chunk_size`.
pub fn select_splitter(
    extension: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<RecursiveSplitter> {
    let kind = SplitterKind::for_extension(extension);
    RecursiveSplitter::new(chunk_size, chunk_overlap, kind.separators())
}
