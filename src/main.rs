mod api;
mod cli;
mod config;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "matchcast")]
#[command(about = "Live sports match data and LLM predictions for soccer, basketball and tennis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show live match data from the feed
    Live {
        #[arg(short, long)]
        sport: String,
        #[arg(short, long)]
        match_id: Option<String>,
    },
    /// Generate a prediction for a live match
    Predict {
        #[arg(short, long)]
        sport: String,
        #[arg(short, long)]
        match_id: String,
        #[arg(short = 't', long, default_value = "match_outcome")]
        prediction_type: String,
        #[arg(short, long)]
        recent_form: Option<String>,
    },
    /// Normalize a saved scoreboard JSON file
    Normalize {
        #[arg(short, long)]
        sport: String,
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize tracing
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting {} on port {}", config.app_name, port);
            api::serve(&config, port).await?;
        }
        Some(Commands::Live { sport, match_id }) => {
            tracing::info!("Fetching live data for sport: {}", sport);
            cli::show_live(&config, &sport, match_id.as_deref()).await?;
        }
        Some(Commands::Predict { sport, match_id, prediction_type, recent_form }) => {
            tracing::info!("Predicting {} match {}", sport, match_id);
            cli::predict(&config, &sport, &match_id, &prediction_type, recent_form.as_deref())
                .await?;
        }
        Some(Commands::Normalize { sport, file }) => {
            cli::normalize_file(&sport, &file).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting {} on port {}", config.app_name, config.port);
            api::serve(&config, config.port).await?;
        }
    }

    Ok(())
}
