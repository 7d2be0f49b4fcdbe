//! The `clipsight serve` command.

use std::sync::Arc;

use clap::Args;
use clipsight::server::{self, AppState};
use clipsight_core::{Analyzer, Config};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides `server.host`)
    #[arg(long, env = "CLIPSIGHT_HOST")]
    pub host: Option<String>,

    /// Bind port (overrides `server.port`)
    #[arg(short, long, env = "CLIPSIGHT_PORT")]
    pub port: Option<u16>,
}

/// Load the model, warm the label caches, and serve until shutdown.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let analyzer = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || -> clipsight_core::Result<Analyzer> {
            let analyzer = Analyzer::load(&config)?;
            analyzer.warm()?;
            Ok(analyzer)
        })
        .await??
    };

    tracing::info!(
        "Model: {} on {}",
        analyzer.model_name(),
        analyzer.device()
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(analyzer, &config));
    server::start(state, &addr).await
}
