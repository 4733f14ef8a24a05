//! ragprep - chunk and embed documents for retrieval
//!
//! # Examples
//!
//! ```bash
//! # Split documents into chunk records
//! ragprep ingest data/raw_docs -o data/processed
//!
//! # Embed the records with OpenAI
//! OPENAI_API_KEY=sk-... ragprep embed data/processed -o data/embeddings
//!
//! # Offline dry run with the hashing embedder
//! ragprep embed --provider hash --format json
//!
//! # Show configuration
//! ragprep show-config
//! ```

use clap::Parser;
use ragprep::cli::output::print_error;
use ragprep::cli::{run, Cli, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "ragprep=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
