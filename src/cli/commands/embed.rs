//! Embed command - attach embeddings to chunk records

use crate::cli::commands::{completed_at, run_blocking};
use crate::cli::output::{colors, format_duration, format_failures, print_warning, MAX_LISTED_FAILURES};
use crate::cli::OutputFormat;
use crate::core::cancel::CancelFlag;
use crate::core::config::EmbeddingProvider;
use crate::core::services::Services;
use crate::core::types::Failure;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the embed command
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Directory of chunk records [default: paths.chunks_dir]
    pub input: Option<PathBuf>,

    /// Directory for embedded records [default: paths.embeddings_dir]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Records per embedding request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Embedding provider (openai or hash)
    #[arg(long)]
    pub provider: Option<EmbeddingProvider>,

    /// Embedding model name
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Requested vector length
    #[arg(long)]
    pub dimensions: Option<usize>,

    /// API key for the openai provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Embedding result response
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub input: String,
    pub output: String,
    pub provider: String,
    pub model: String,
    pub directories_visited: usize,
    pub batches_submitted: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    pub records_embedded: usize,
    pub records_failed: usize,
    pub duration_secs: f64,
    pub cancelled: bool,
    pub completed_at: String,
    pub failures: Vec<Failure>,
}

/// Execute the embed command
pub async fn execute(
    args: EmbedArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let input = args.input.unwrap_or_else(|| config.paths.chunks_dir.clone());
    let output = args
        .output
        .unwrap_or_else(|| config.paths.embeddings_dir.clone());

    if !input.is_dir() {
        return Err(format!(
            "Chunks directory '{}' does not exist or is not a directory. Run 'ragprep ingest' first.",
            input.display()
        )
        .into());
    }

    let mut embedding = config.embedding.clone();
    if let Some(batch_size) = args.batch_size {
        embedding.batch_size = batch_size;
    }
    if let Some(provider) = args.provider {
        embedding.provider = provider;
    }
    if let Some(model) = args.model {
        embedding.model = model;
    }
    if let Some(base_url) = args.base_url {
        embedding.base_url = base_url;
    }
    if args.dimensions.is_some() {
        embedding.dimensions = args.dimensions;
    }
    embedding.validate()?;

    let model = match embedding.provider {
        EmbeddingProvider::OpenAi => embedding.model.clone(),
        EmbeddingProvider::Hash => "hash".to_string(),
    };

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Embedding {} into {} with {} (batch size {})...",
            colors::file_path(&input.display().to_string()),
            colors::file_path(&output.display().to_string()),
            colors::label(&format!("{}/{}", embedding.provider, model)),
            embedding.batch_size
        );
    }

    // The HTTP client is blocking, so it is built and dropped on the
    // blocking pool together with the pipeline.
    let cancel = CancelFlag::new();
    let job_services = Arc::clone(services);
    let job_embedding = embedding.clone();
    let job_input = input.clone();
    let job_output = output.clone();
    let job_cancel = cancel.clone();
    let api_key = args.api_key;

    let stats = run_blocking(cancel, move || {
        let pipeline = job_services
            .create_embedding_pipeline(&job_embedding, api_key.as_deref())?
            .with_cancel_flag(job_cancel);
        pipeline.embed_directory(&job_input, &job_output)
    })
    .await?;

    let response = EmbedResponse {
        input: input.to_string_lossy().into_owned(),
        output: output.to_string_lossy().into_owned(),
        provider: embedding.provider.to_string(),
        model,
        directories_visited: stats.directories_visited,
        batches_submitted: stats.batches_submitted,
        batches_succeeded: stats.batches_succeeded,
        batches_failed: stats.batches_failed,
        records_embedded: stats.records_embedded,
        records_failed: stats.records_failed,
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

fn print_human(response: &EmbedResponse) {
    println!(
        "{} {} records from {} directories in {}",
        colors::success("Embedded"),
        colors::number(&response.records_embedded.to_string()),
        colors::number(&response.directories_visited.to_string()),
        colors::number(&format_duration(response.duration_secs))
    );
    println!(
        "Batches: {} succeeded, {} failed",
        colors::number(&response.batches_succeeded.to_string()),
        colors::number(&response.batches_failed.to_string())
    );

    if response.records_failed > 0 {
        print_warning(&format!("{} records not written:", response.records_failed));
        for line in format_failures(&response.failures, MAX_LISTED_FAILURES) {
            eprintln!("{line}");
        }
    }

    if response.cancelled {
        print_warning("Run interrupted; remaining batches were not submitted");
    }
}
