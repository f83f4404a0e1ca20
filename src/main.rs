mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confsync")]
#[command(about = "Keep a calendar in sync with a CSV file of conferences")]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/confsync/config.toml)
    #[arg(long, global = true, env = "CONFSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize confsync with a calendar provider
    Auth {
        provider: String, // e.g. "google"
    },
    /// Show what a sync would change
    Status {
        /// CSV file to read instead of `source` from the config
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Make the remote calendar match the CSV file
    Sync {
        /// CSV file to read instead of `source` from the config
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the plan without applying it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Auth { provider } => commands::auth::run(&provider).await,
        Commands::Status { file } => commands::status::run(config, file.as_deref()).await,
        Commands::Sync { file, dry_run } => {
            commands::sync::run(config, file.as_deref(), dry_run).await
        }
    }
}
