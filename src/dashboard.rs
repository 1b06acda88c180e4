// src/dashboard.rs
//
// View state behind the dashboard: what was last shown for holdings and the
// market overview, plus the notification log. Failed refreshes never touch
// the displayed data; they only add an error notification.

use crate::error::ApiError;
use crate::market::fetch_market_quotes;
use crate::models::{
    DashboardSnapshot, Holding, MarketQuote, NewHolding, Notification, NotificationLevel,
    PortfolioSummary, WatchlistEntry,
};
use crate::portfolio::attach_prices;
use crate::quotes::QuoteSource;
use crate::storage::HoldingStore;
use chrono::Utc;
use log::{debug, error, info};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const MAX_NOTIFICATIONS: usize = 50;

pub const FETCH_STOCKS_FAILED: &str = "Failed to fetch stocks";
pub const FETCH_MARKET_FAILED: &str = "Failed to fetch market prices";
pub const ADD_STOCK_FAILED: &str = "Failed to add stock";
pub const UPDATE_STOCK_FAILED: &str = "Failed to update stock";
pub const DELETE_STOCK_FAILED: &str = "Failed to delete stock";
pub const STOCK_ADDED: &str = "Stock added successfully";
pub const STOCK_UPDATED: &str = "Stock updated successfully";
pub const STOCK_DELETED: &str = "Stock deleted successfully";

/// Displayed holdings, tagged with the store read they came from.
#[derive(Default)]
struct HoldingsView {
    read_seq: u64,
    holdings: Vec<Holding>,
}

pub struct Dashboard {
    store: Mutex<HoldingStore>,
    quotes: Arc<dyn QuoteSource>,
    watchlist: Vec<WatchlistEntry>,
    reads: AtomicU64,
    holdings: RwLock<HoldingsView>,
    market: RwLock<Vec<MarketQuote>>,
    notifications: Mutex<VecDeque<Notification>>,
}

impl Dashboard {
    pub fn new(
        store: HoldingStore,
        quotes: Arc<dyn QuoteSource>,
        watchlist: Vec<WatchlistEntry>,
    ) -> Self {
        Dashboard {
            store: Mutex::new(store),
            quotes,
            watchlist,
            reads: AtomicU64::new(0),
            holdings: RwLock::new(HoldingsView::default()),
            market: RwLock::new(Vec::new()),
            notifications: Mutex::new(VecDeque::new()),
        }
    }

    /// Reads every stored holding, prices it, and replaces the displayed list.
    ///
    /// Loads can overlap. A load whose store read is older than the one
    /// already displayed is discarded and the displayed list is returned.
    pub async fn load_holdings(&self) -> Result<Vec<Holding>, ApiError> {
        match self.priced_holdings().await {
            Ok((read_seq, priced)) => {
                let mut view = self.holdings.write().await;
                if read_seq < view.read_seq {
                    debug!("Discarding stale holdings load #{}", read_seq);
                    return Ok(view.holdings.clone());
                }
                info!("Loaded {} holdings with current prices", priced.len());
                *view = HoldingsView {
                    read_seq,
                    holdings: priced.clone(),
                };
                Ok(priced)
            }
            Err(e) => {
                error!("Error fetching stocks: {}", e);
                self.notify(NotificationLevel::Error, FETCH_STOCKS_FAILED)
                    .await;
                Err(e)
            }
        }
    }

    async fn priced_holdings(&self) -> Result<(u64, Vec<Holding>), ApiError> {
        let (read_seq, stored) = {
            let store = self.store.lock().await;
            let read_seq = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            (read_seq, store.get_holdings()?)
        };
        let priced = attach_prices(self.quotes.as_ref(), stored).await?;
        Ok((read_seq, priced))
    }

    /// Refetches the watchlist and replaces the displayed market rows.
    pub async fn refresh_market(&self) -> Result<Vec<MarketQuote>, ApiError> {
        match fetch_market_quotes(self.quotes.as_ref(), &self.watchlist).await {
            Ok(quotes) => {
                info!("Refreshed {} market quotes", quotes.len());
                *self.market.write().await = quotes.clone();
                Ok(quotes)
            }
            Err(e) => {
                error!("Error fetching market prices: {}", e);
                self.notify(NotificationLevel::Error, FETCH_MARKET_FAILED)
                    .await;
                Err(e.into())
            }
        }
    }

    pub async fn add_holding(&self, new_holding: NewHolding) -> Result<Holding, ApiError> {
        let new_holding = NewHolding {
            symbol: new_holding.symbol.to_uppercase(),
            ..new_holding
        };
        let added = self.store.lock().await.add_holding(new_holding);
        match added {
            Ok(holding) => {
                self.notify(NotificationLevel::Success, STOCK_ADDED).await;
                let _ = self.load_holdings().await;
                Ok(holding)
            }
            Err(e) => {
                error!("Error adding stock: {}", e);
                self.notify(NotificationLevel::Error, ADD_STOCK_FAILED).await;
                Err(e.into())
            }
        }
    }

    /// Replaces the holding stored under `id`. The id in the path wins over
    /// whatever the body carries.
    pub async fn update_holding(&self, id: &str, holding: Holding) -> Result<Holding, ApiError> {
        let holding = Holding {
            id: id.to_string(),
            symbol: holding.symbol.to_uppercase(),
            ..holding
        };
        let updated = self.store.lock().await.update_holding(holding.clone());
        match updated {
            Ok(true) => {
                self.notify(NotificationLevel::Success, STOCK_UPDATED).await;
                let _ = self.load_holdings().await;
                Ok(holding)
            }
            Ok(false) => Err(ApiError::NotFound { id: id.to_string() }),
            Err(e) => {
                error!("Error updating stock: {}", e);
                self.notify(NotificationLevel::Error, UPDATE_STOCK_FAILED)
                    .await;
                Err(e.into())
            }
        }
    }

    pub async fn delete_holding(&self, id: &str) -> Result<(), ApiError> {
        let removed = self.store.lock().await.delete_holding(id);
        match removed {
            Ok(true) => {
                self.notify(NotificationLevel::Success, STOCK_DELETED).await;
                let _ = self.load_holdings().await;
                Ok(())
            }
            Ok(false) => Err(ApiError::NotFound { id: id.to_string() }),
            Err(e) => {
                error!("Error deleting stock: {}", e);
                self.notify(NotificationLevel::Error, DELETE_STOCK_FAILED)
                    .await;
                Err(e.into())
            }
        }
    }

    pub async fn holdings(&self) -> Vec<Holding> {
        self.holdings.read().await.holdings.clone()
    }

    pub async fn market(&self) -> Vec<MarketQuote> {
        self.market.read().await.clone()
    }

    pub async fn summary(&self) -> PortfolioSummary {
        PortfolioSummary::from_holdings(&self.holdings.read().await.holdings)
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().await.iter().cloned().collect()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let holdings = self.holdings().await;
        DashboardSnapshot {
            summary: PortfolioSummary::from_holdings(&holdings),
            holdings,
            market: self.market().await,
            notifications: self.notifications().await,
        }
    }

    async fn notify(&self, level: NotificationLevel, message: &str) {
        let mut log = self.notifications.lock().await;
        if log.len() == MAX_NOTIFICATIONS {
            log.pop_front();
        }
        log.push_back(Notification {
            level,
            message: message.to_string(),
            at: Utc::now(),
        });
    }
}
