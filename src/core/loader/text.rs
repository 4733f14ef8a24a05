//! Plain text loader.

use std::path::Path;

use crate::core::error::{RagprepError, Result};
use crate::core::loader::read_bytes;
use crate::core::types::LoadedDocument;

/// Load a UTF-8 text file as a single unit
pub fn load(path: &Path) -> Result<Vec<LoadedDocument>> {
    let bytes = read_bytes(path)?;
    let content = String::from_utf8(bytes).map_err(|e| {
        RagprepError::LoadFailed(format!(
            "{path:?} is not valid UTF-8 (invalid byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })?;

    Ok(vec![LoadedDocument::from_source(content, path)])
}
