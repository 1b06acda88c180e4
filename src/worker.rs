// src/worker.rs
use crate::dashboard::Dashboard;
use log::{debug, info};
use std::sync::Arc;
use tokio::time::{self, Duration, MissedTickBehavior};

/// Refreshes the market overview every `period`, starting immediately.
///
/// Each refresh is awaited before the next tick is taken, so a slow provider
/// delays the schedule instead of stacking requests. Failures are already
/// logged and surfaced by the dashboard; the loop keeps going.
pub async fn market_refresh_worker(dashboard: Arc<Dashboard>, period: Duration) {
    info!("Market refresh every {}s", period.as_secs());
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        debug!("Refreshing market overview");
        let _ = dashboard.refresh_market().await;
    }
}
