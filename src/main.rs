use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use scriptforge::cli::Args;
use scriptforge::config::Config;
use scriptforge::log::RequestLog;
use scriptforge::provider::make_provider;
use scriptforge::server::{self, AppState};
use scriptforge::store::VersionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::from_args(&args);

    // Environment self-check: report, don't refuse to start.
    if config.api_key.is_some() {
        info!("OPENROUTER_API_KEY is configured");
    } else {
        warn!("OPENROUTER_API_KEY is not set; /generate and /fixcode will return errors");
    }
    if config.context_path.exists() {
        info!("context file found at {}", config.context_path.display());
    } else {
        warn!("context file not found at {}", config.context_path.display());
    }
    info!("versions root: {}", config.versions_root.display());

    let provider = make_provider(&config);
    let state = AppState {
        store: Arc::new(VersionStore::new(config.versions_root.clone())),
        log: Arc::new(RequestLog::new()),
        provider,
        config: Arc::new(config),
    };

    server::serve(state).await
}
