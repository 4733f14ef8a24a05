//! Core domain logic (interface-agnostic)
//!
//! This module contains everything the CLI drives, independent of how
//! it is invoked.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Documents, chunks, records and run statistics
//! - **xdg**: XDG directory handling
//! - **loader**: Per-format document loaders
//! - **splitter**: Recursive character splitting
//! - **storage**: Atomic record writes
//! - **ingest**: File walking, chunk writing and the ingestion pipeline
//! - **embed**: Embedding providers and the batch embedding pipeline
//! - **cancel**: Cooperative cancellation
//! - **services**: Unified service container

pub mod cancel;
pub mod config;
pub mod embed;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod services;
pub mod splitter;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{RagprepError, Result};
pub use services::Services;
