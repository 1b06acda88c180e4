// src/main.rs
use anyhow::Context;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use portfolio_tracker::api;
use portfolio_tracker::config;
use portfolio_tracker::dashboard::Dashboard;
use portfolio_tracker::quotes;
use portfolio_tracker::storage::HoldingStore;
use portfolio_tracker::worker::market_refresh_worker;
use reqwest::Client;
use std::sync::Arc;
use tokio::task;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Refuse to start with placeholder credentials.
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration check failed: {}", e);
            return Err(e).context("failed to load configuration");
        }
    };
    info!(
        "Config loaded: provider={:?}, watchlist of {} symbols",
        config.quotes.provider,
        config.market.watchlist.len()
    );

    let store = HoldingStore::open(&config.storage.path, config.storage.key.clone())
        .context("failed to open holdings storage")?;
    info!("Holdings storage at {}", config.storage.path.display());

    let source = quotes::build_source(&config.quotes, Client::new());
    let dashboard = Arc::new(Dashboard::new(
        store,
        source,
        config.market.watchlist.clone(),
    ));

    info!("Starting the portfolio tracker...");
    if let Err(e) = dashboard.load_holdings().await {
        error!("Initial holdings load failed: {}", e);
    }

    let worker_dashboard = dashboard.clone();
    let period = config.market.refresh_interval();
    task::spawn(async move {
        market_refresh_worker(worker_dashboard, period).await;
    });

    let routes = api::routes(dashboard);
    let addr = config.server.addr();
    info!("Server running on http://{}", addr);
    warp::serve(routes).run(addr).await;
    Ok(())
}
