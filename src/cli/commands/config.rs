//! Config command - show current configuration

use crate::cli::output::print_header;
use crate::cli::OutputFormat;
use crate::core::config::{EmbeddingConfig, IngestionConfig, PathsConfig};
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub config_file: String,
    pub config_file_exists: bool,
    pub paths: &'a PathsConfig,
    pub ingestion: &'a IngestionConfig,
    pub embedding: &'a EmbeddingConfig,
}

/// Execute the show-config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;
    let config_file = XdgDirs::new().config_file();

    let response = ConfigResponse {
        config_file: config_file.to_string_lossy().into_owned(),
        config_file_exists: config_file.exists(),
        paths: &config.paths,
        ingestion: &config.ingestion,
        embedding: &config.embedding,
    };

    match format {
        OutputFormat::Human => {
            print_header("Configuration:");
            let note = if response.config_file_exists {
                ""
            } else {
                " (not found, using defaults)"
            };
            println!("# config file: {}{}", response.config_file, note);
            println!("{}", toml::to_string_pretty(config.as_ref())?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
