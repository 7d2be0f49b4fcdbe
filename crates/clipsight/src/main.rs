//! Clipsight CLI - zero-shot image analysis service over CLIP embeddings.
//!
//! Clipsight scores images against fixed text label sets and serves facial
//! feature and food analysis reports over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Fetch the CLIP ONNX model files
//! clipsight models download
//!
//! # Start the HTTP service
//! clipsight serve --port 5001
//!
//! # View configuration
//! clipsight config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipsight::logging;
use clipsight_core::Config;

mod cli;

/// Clipsight - zero-shot image analysis service over CLIP embeddings.
#[derive(Parser, Debug)]
#[command(name = "clipsight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "CLIPSIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP analysis service
    Serve(cli::serve::ServeArgs),

    /// Manage the CLIP model files (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Logging isn't initialized yet, so config warnings go to stderr directly.
    let config = if config_path.exists() {
        match Config::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config from {}: {e}\n  \
                     Using default configuration.",
                    config_path.display()
                );
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("clipsight v{}", clipsight_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    }
}
