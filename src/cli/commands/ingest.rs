//! Ingest command - split documents into chunk records

use crate::cli::commands::{completed_at, run_blocking};
use crate::cli::output::{colors, format_duration, format_failures, print_warning, MAX_LISTED_FAILURES};
use crate::cli::OutputFormat;
use crate::core::cancel::CancelFlag;
use crate::core::services::Services;
use crate::core::types::Failure;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory of documents to ingest [default: paths.input_dir]
    pub input: Option<PathBuf>,

    /// Directory for chunk records [default: paths.chunks_dir]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Glob patterns to exclude (can be specified multiple times;
    /// replaces the configured list)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,

    /// Skip files larger than this many megabytes (0 = no limit)
    #[arg(long)]
    pub max_file_size_mb: Option<usize>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Ingestion result response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub input: String,
    pub output: String,
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub chunks_written: usize,
    pub duration_secs: f64,
    pub cancelled: bool,
    pub completed_at: String,
    pub failures: Vec<Failure>,
}

/// Execute the ingest command
pub async fn execute(
    args: IngestArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let input = args.input.unwrap_or_else(|| config.paths.input_dir.clone());
    let output = args.output.unwrap_or_else(|| config.paths.chunks_dir.clone());

    if !input.is_dir() {
        return Err(format!(
            "Input directory '{}' does not exist or is not a directory.",
            input.display()
        )
        .into());
    }

    let mut ingestion = config.ingestion.clone();
    if let Some(chunk_size) = args.chunk_size {
        ingestion.chunk_size = chunk_size;
    }
    if let Some(chunk_overlap) = args.chunk_overlap {
        ingestion.chunk_overlap = chunk_overlap;
    }
    if let Some(max_file_size_mb) = args.max_file_size_mb {
        ingestion.max_file_size_mb = max_file_size_mb;
    }
    if !args.exclude.is_empty() {
        ingestion.exclude_patterns = args.exclude;
    }

    let cancel = CancelFlag::new();
    let mut pipeline = services
        .create_ingestion_pipeline(&output, &ingestion)?
        .with_cancel_flag(cancel.clone());

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Ingesting {} into {} (chunk size {}, overlap {})...",
            colors::file_path(&input.display().to_string()),
            colors::file_path(&output.display().to_string()),
            ingestion.chunk_size,
            ingestion.chunk_overlap
        );
    }

    let job_input = input.clone();
    let stats = run_blocking(cancel, move || pipeline.ingest_directory(&job_input)).await?;

    let response = IngestResponse {
        input: input.to_string_lossy().into_owned(),
        output: output.to_string_lossy().into_owned(),
        files_discovered: stats.files_discovered,
        files_processed: stats.files_processed,
        files_failed: stats.files_failed,
        chunks_written: stats.chunks_written,
        duration_secs: stats.duration_ms as f64 / 1000.0,
        cancelled: stats.cancelled,
        completed_at: completed_at(),
        failures: stats.failures,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_human(response: &IngestResponse) {
    println!(
        "{} {} of {} files ({} chunks) in {}",
        colors::success("Ingested"),
        colors::number(&response.files_processed.to_string()),
        colors::number(&response.files_discovered.to_string()),
        colors::number(&response.chunks_written.to_string()),
        colors::number(&format_duration(response.duration_secs))
    );

    if response.files_failed > 0 {
        print_warning(&format!("{} files skipped:", response.files_failed));
        for line in format_failures(&response.failures, MAX_LISTED_FAILURES) {
            eprintln!("{line}");
        }
    }

    if response.cancelled {
        print_warning("Run interrupted; remaining files were not processed");
    }
}
