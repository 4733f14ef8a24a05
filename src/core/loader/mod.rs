//! Document loading.
//!
//! A file's extension picks a [`DocumentKind`]; each kind turns the file
//! into one or more [`LoadedDocument`] units. PDF files produce one unit
//! per page, every other kind produces a single unit for the whole file.

pub mod html;
pub mod markdown;
pub mod pdf;
pub mod text;

use std::fs;
use std::path::Path;

use crate::core::error::{RagprepError, Result};
use crate::core::types::LoadedDocument;

/// Extensions the loaders understand, lower-case and without the dot
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "html", "htm", "pdf"];

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Markdown,
    Html,
    Pdf,
}

impl DocumentKind {
    /// Map an extension (with or without the dot, any case) to a kind
    pub fn from_extension(extension: &str) -> Option<Self> {
        match normalize_extension(extension).as_str() {
            "txt" => Some(DocumentKind::PlainText),
            "md" | "markdown" => Some(DocumentKind::Markdown),
            "html" | "htm" => Some(DocumentKind::Html),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text",
            DocumentKind::Markdown => "markdown",
            DocumentKind::Html => "html",
            DocumentKind::Pdf => "pdf",
        }
    }

    /// Load `path` into its document units
    pub fn load(self, path: &Path) -> Result<Vec<LoadedDocument>> {
        match self {
            DocumentKind::PlainText => text::load(path),
            DocumentKind::Markdown => markdown::load(path),
            DocumentKind::Html => html::load(path),
            DocumentKind::Pdf => pdf::load(path),
        }
    }
}

/// Pick the loader for a file from its extension.
///
/// # Errors
///
/// `UnsupportedFileType` for unknown extensions and for files with no
/// extension at all.
pub fn select_loader(path: &Path) -> Result<DocumentKind> {
    let extension = extension_of(path);
    DocumentKind::from_extension(&extension).ok_or_else(|| {
        let shown = if extension.is_empty() {
            format!("(no extension) {path:?}")
        } else {
            format!(".{extension} {path:?}")
        };
        RagprepError::UnsupportedFileType(shown)
    })
}

/// Lower-case an extension and strip any leading dot
pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// Normalized extension of `path`, empty when it has none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| RagprepError::LoadFailed(format!("Failed to read {path:?}: {e}")))
}
