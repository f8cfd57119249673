//! tabplan HTTP server
//!
//! Accepts natural-language table requests, turns them into plans and runs
//! the plans against uploaded tables.

use anyhow::Context;
use tabplan_server::{logging, serve, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("TABPLAN_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path).with_context(|| format!("loading {}", config_path))?;
    config.apply_logging_env();
    logging::init()?;

    let state = AppState::new(config)?;
    info!(
        addr = %state.config.server.addr(),
        detectors = ?state.translator.detector_names(),
        "starting tabplan server"
    );

    serve(state).await
}
