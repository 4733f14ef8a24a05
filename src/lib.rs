//! ragprep - Document preparation for retrieval-augmented generation
//!
//! Turns a tree of raw documents into embedded chunk records in two
//! stages, each reading and writing plain JSON files on disk:
//!
//! 1. **Ingestion**: load `.txt`, `.md`, `.html` and `.pdf` files, split
//!    them into overlapping chunks and write one record per chunk.
//! 2. **Embedding**: send chunk records to an embedding service in
//!    batches and write each record back out with its vector.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - loader, splitter (document parsing and chunking)
//!   - ingest, embed (the two pipelines)
//!   - services (unified service container)
//!
//! - **cli**: clap adapter (depends on core)
//!
//! # Key Features
//!
//! - UTF-8 safe chunking (character-based, never panics)
//! - Structure-aware splitting for Markdown and HTML
//! - Per-file and per-batch failure isolation
//! - Atomic record writes; re-runs overwrite identically

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{RagprepError, Result};
pub use core::services::Services;
pub use core::types::*;
