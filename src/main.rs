use anyhow::Context;
use memo_summary::{
    config::Config,
    logging,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    logging::init(&config.logging.level);

    let addr = config.server.socket_addr()?;
    tracing::info!(env = ?config.server.env, "Starting memo-summary server...");

    let state = AppState::from_config(config)?;
    server::start_server(addr, state).await
}
