//! PDF loader.
//!
//! Text is extracted per page with pdf-extract on a worker thread, since
//! malformed files can make it spin or panic. If that fails or takes
//! longer than [`EXTRACTION_TIMEOUT`], lopdf's own text extraction is
//! tried before giving up.
//!
//! A worker that times out cannot be stopped: it keeps running, detached,
//! until pdf-extract returns. At most [`MAX_RUNNING_EXTRACTIONS`] workers
//! exist at once; while that many are still stuck, new files go straight
//! to lopdf instead of spawning another thread.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::core::error::{RagprepError, Result};
use crate::core::loader::read_bytes;
use crate::core::types::LoadedDocument;

pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on live pdf-extract worker threads
pub const MAX_RUNNING_EXTRACTIONS: usize = 4;

static RUNNING_EXTRACTIONS: AtomicUsize = AtomicUsize::new(0);

/// A claimed worker slot, released when the worker thread ends
struct ExtractionSlot;

impl ExtractionSlot {
    fn acquire() -> Option<Self> {
        RUNNING_EXTRACTIONS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |running| {
                (running < MAX_RUNNING_EXTRACTIONS).then_some(running + 1)
            })
            .ok()
            .map(|_| ExtractionSlot)
    }
}

impl Drop for ExtractionSlot {
    fn drop(&mut self) {
        RUNNING_EXTRACTIONS.fetch_sub(1, Ordering::SeqCst);
    }
}

static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Load a PDF file as one unit per page
pub fn load(path: &Path) -> Result<Vec<LoadedDocument>> {
    let bytes = read_bytes(path)?;
    let pages = extract_pages(&bytes)
        .map_err(|e| RagprepError::LoadFailed(format!("Failed to extract text from {path:?}: {e}")))?;

    tracing::debug!("Extracted {} pages from {:?}", pages.len(), path);
    Ok(pages_to_documents(pages, path))
}

/// Turn raw page texts into units carrying `page` (0-based) and
/// `total_pages`
pub fn pages_to_documents(pages: Vec<String>, source: &Path) -> Vec<LoadedDocument> {
    let total_pages = pages.len();
    pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| {
            let mut unit = LoadedDocument::from_source(clean_page_text(&text), source);
            unit.metadata.insert("page".to_string(), Value::from(page));
            unit.metadata
                .insert("total_pages".to_string(), Value::from(total_pages));
            unit
        })
        .collect()
}

/// Drop NUL bytes and trailing spaces, and cap blank-line runs at one
fn clean_page_text(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(|line| line.trim_end()).collect();
    let joined = lines.join("\n").replace('\0', "");
    EXCESS_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

fn extract_pages(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    match extract_with_timeout(bytes) {
        Ok(pages) => Ok(pages),
        Err(primary) => {
            tracing::warn!("pdf-extract failed ({}), falling back to lopdf", primary);
            extract_with_lopdf(bytes).map_err(|fallback| format!("{primary}; lopdf: {fallback}"))
        }
    }
}

fn extract_with_timeout(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    let slot = ExtractionSlot::acquire().ok_or_else(|| {
        format!("{MAX_RUNNING_EXTRACTIONS} earlier extractions are still running")
    })?;
    let data = bytes.to_vec();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let _slot = slot;
        let result = pdf_extract::extract_text_from_mem_by_pages(&data).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    match rx.recv_timeout(EXTRACTION_TIMEOUT) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(format!(
            "extraction timed out after {}s",
            EXTRACTION_TIMEOUT.as_secs()
        )),
        Err(RecvTimeoutError::Disconnected) => Err("extraction thread panicked".to_string()),
    }
}

fn extract_with_lopdf(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

    page_numbers
        .iter()
        .map(|&number| {
            document
                .extract_text(&[number])
                .map_err(|e| format!("page {number}: {e}"))
        })
        .collect()
}
