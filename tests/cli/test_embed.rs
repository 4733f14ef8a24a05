//! Tests for the embed command
//!
//! All tests use the offline hash provider; the OpenAI provider is only
//! checked for its missing-key error.

use super::test_helpers::{
    create_cli_test_services, create_test_docs, hash_embed_args, ingest_args, sample_docs,
};
use crate::common::{read_json, record_files};
use ragprep::cli::commands::{embed, ingest};
use ragprep::cli::OutputFormat;
use ragprep::core::config::EmbeddingProvider;

/// Test embedding the configured chunks directory after ingest
#[tokio::test]
async fn test_embed_after_ingest_default_directories() {
    let (services, _temp) = create_cli_test_services();
    create_test_docs(&services.config.paths.input_dir, &sample_docs());

    ingest::execute(ingest_args(None, None), &services, OutputFormat::Human)
        .await
        .expect("ingest failed");
    let result = embed::execute(hash_embed_args(None, None), &services, OutputFormat::Json).await;

    assert!(result.is_ok(), "Embed should succeed: {:?}", result.err());
    let embeddings_dir = &services.config.paths.embeddings_dir;
    let files = record_files(embeddings_dir);
    assert_eq!(files.len(), 3);

    let record = read_json(&embeddings_dir.join("raw_docs/intro/intro_txt_0000.json"));
    assert_eq!(record["content"], "An introduction to the handbook.");
    assert_eq!(record["embedding"].as_array().unwrap().len(), 8);
}

/// Test batch size override from flags
#[tokio::test]
async fn test_embed_batch_size_override() {
    let (services, temp) = create_cli_test_services();
    let input = temp.path().join("docs");
    let chunks = temp.path().join("chunks");
    let vectors = temp.path().join("vectors");
    let content = "x".repeat(500);
    create_test_docs(&input, &[("blob.txt", content.as_str())]);

    let mut ingest = ingest_args(Some(input), Some(chunks.clone()));
    ingest.chunk_size = Some(100);
    ingest.chunk_overlap = Some(0);
    ingest::execute(ingest, &services, OutputFormat::Human)
        .await
        .unwrap();

    let mut args = hash_embed_args(Some(chunks), Some(vectors.clone()));
    args.batch_size = Some(2);
    let result = embed::execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_ok());
    assert_eq!(record_files(&vectors).len(), 5);
}

/// Test that a zero batch size is rejected
#[tokio::test]
async fn test_embed_zero_batch_size() {
    let (services, temp) = create_cli_test_services();
    let chunks = temp.path().join("chunks");
    std::fs::create_dir_all(&chunks).unwrap();

    let mut args = hash_embed_args(Some(chunks), None);
    args.batch_size = Some(0);
    let result = embed::execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_err());
}

/// Test that the openai provider requires an API key
#[tokio::test]
async fn test_embed_openai_without_key() {
    let (services, temp) = create_cli_test_services();
    let chunks = temp.path().join("chunks");
    std::fs::create_dir_all(&chunks).unwrap();

    let mut args = hash_embed_args(Some(chunks), None);
    args.provider = Some(EmbeddingProvider::OpenAi);
    args.dimensions = None;
    let result = embed::execute(args, &services, OutputFormat::Human).await;

    assert!(result.is_err());
    let err = result.err().unwrap().to_string();
    assert!(err.contains("API key"), "Unexpected error: {err}");
}

/// Test embed with a missing chunks directory
#[tokio::test]
async fn test_embed_missing_input() {
    let (services, _temp) = create_cli_test_services();

    let result = embed::execute(hash_embed_args(None, None), &services, OutputFormat::Human).await;

    assert!(result.is_err());
    let err = result.err().unwrap().to_string();
    assert!(err.contains("ragprep ingest"), "Unexpected error: {err}");
}
