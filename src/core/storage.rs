//! Filesystem helpers shared by both pipelines.
//!
//! The output trees double as the pipelines' progress state: a record
//! file that exists is a record that was fully produced. Writes go to a
//! hidden temp file in the destination directory and are renamed into
//! place, so no reader ever observes a half-written record.

use std::fs;
use std::path::Path;

use crate::core::error::{RagprepError, Result};

/// Create a directory and all parents, tolerating concurrent creation
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        RagprepError::WriteFailed(format!("Failed to create directory {path:?}: {e}"))
    })
}

/// Fail with `InvalidPath` when `output` resolves to the same directory
/// as `input`.
///
/// Both must exist. Writing records into the tree being read would
/// overwrite the inputs (embedding) or feed the records back in as
/// inputs on the next run (ingestion).
pub fn ensure_distinct_dirs(input: &Path, output: &Path) -> Result<()> {
    let (Ok(input_canonical), Ok(output_canonical)) = (input.canonicalize(), output.canonicalize())
    else {
        return Ok(());
    };

    if input_canonical == output_canonical {
        return Err(RagprepError::InvalidPath(format!(
            "Output directory {output:?} is the same directory as input {input:?}"
        )));
    }
    Ok(())
}

/// Write `contents` to `path` via temp file and rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RagprepError::WriteFailed(format!("Invalid record path: {path:?}")))?;

    // Hidden and not `.json`-suffixed, so neither walker picks it up
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&temp_path, contents)
        .map_err(|e| RagprepError::WriteFailed(format!("Failed to write {temp_path:?}: {e}")))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(RagprepError::WriteFailed(format!(
            "Failed to move record into place at {path:?}: {e}"
        )));
    }

    Ok(())
}
