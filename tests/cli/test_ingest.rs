//! Tests for the ingest command
//!
//! Covers:
//! - Default input and output directories from configuration
//! - Explicit directories and chunk overrides
//! - Exclusion patterns
//! - Error handling for missing input

use super::test_helpers::{create_cli_test_services, create_test_docs, ingest_args, sample_docs};
use crate::common::record_files;
use ragprep::cli::commands::ingest::execute;
use ragprep::cli::OutputFormat;

/// Test ingest with the configured default directories
#[tokio::test]
async fn test_ingest_default_directories() {
    let (services, _temp) = create_cli_test_services();
    let input = services.config.paths.input_dir.clone();
    create_test_docs(&input, &sample_docs());

    let result = execute(ingest_args(None, None), &services, OutputFormat::Human).await;

    assert!(result.is_ok(), "Ingest should succeed: {:?}", result.err());
    let chunks_dir = &services.config.paths.chunks_dir;
    assert!(chunks_dir.join("raw_docs/intro/intro_txt_0000.json").exists());
    assert!(chunks_dir.join("raw_docs/guide/guide_md_0000.json").exists());
    assert!(chunks_dir.join("raw_docs/faq/faq_html_0000.json").exists());
    assert!(!chunks_dir.join("raw_docs/slides").exists());
}

/// Test ingest with explicit directories and JSON output
#[tokio::test]
async fn test_ingest_explicit_directories_json() {
    let (services, temp) = create_cli_test_services();
    let input = temp.path().join("docs");
    let output = temp.path().join("chunks");
    create_test_docs(&input, &sample_docs());

    let result = execute(
        ingest_args(Some(input), Some(output.clone())),
        &services,
        OutputFormat::Json,
    )
    .await;

    assert!(result.is_ok(), "JSON ingest should succeed: {:?}", result.err());
    assert_eq!(record_files(&output).len(), 3);
    assert!(!services.config.paths.chunks_dir.exists());
}

/// Test chunk size override from flags
#[tokio::test]
async fn test_ingest_chunk_size_override() {
    let (services, temp) = create_cli_test_services();
    let input = temp.path().join("docs");
    let output = temp.path().join("chunks");
    let content = "x".repeat(250);
    create_test_docs(&input, &[("blob.txt", content.as_str())]);

    let mut args = ingest_args(Some(input), Some(output.clone()));
    args.chunk_size = Some(100);
    args.chunk_overlap = Some(0);

    let result = execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_ok());
    assert_eq!(record_files(&output).len(), 3);
}

/// Test that invalid chunk parameters are rejected before any work
#[tokio::test]
async fn test_ingest_overlap_not_less_than_size() {
    let (services, temp) = create_cli_test_services();
    let input = temp.path().join("docs");
    let output = temp.path().join("chunks");
    create_test_docs(&input, &sample_docs());

    let mut args = ingest_args(Some(input), Some(output.clone()));
    args.chunk_size = Some(100);
    args.chunk_overlap = Some(100);

    let result = execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_err());
    assert!(!output.exists());
}

/// Test exclusion patterns from flags
#[tokio::test]
async fn test_ingest_exclude_patterns() {
    let (services, temp) = create_cli_test_services();
    let input = temp.path().join("docs");
    let output = temp.path().join("chunks");
    create_test_docs(
        &input,
        &[("keep.txt", "Keep."), ("archive/old.txt", "Old.")],
    );

    let mut args = ingest_args(Some(input), Some(output.clone()));
    args.exclude = vec!["**/archive/**".to_string()];

    let result = execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_ok());
    assert_eq!(record_files(&output).len(), 1);
}

/// Test ingest of a nonexistent input directory
#[tokio::test]
async fn test_ingest_missing_input() {
    let (services, temp) = create_cli_test_services();

    let result = execute(
        ingest_args(Some(temp.path().join("nope")), None),
        &services,
        OutputFormat::Human,
    )
    .await;

    assert!(result.is_err());
    let err = result.err().unwrap().to_string();
    assert!(err.contains("does not exist"), "Unexpected error: {err}");
}
