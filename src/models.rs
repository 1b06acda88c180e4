// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded stock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Taken from the path on updates, so request bodies may omit it.
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub purchase_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

/// Form payload for a holding that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub purchase_price: f64,
}

impl NewHolding {
    pub fn into_holding(self, id: String) -> Holding {
        Holding {
            id,
            symbol: self.symbol,
            name: self.name,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            current_price: None,
        }
    }
}

/// A symbol on the market overview, independent of the user's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub total_value: f64,
    pub total_return: f64,
    pub return_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Everything the dashboard shows at once.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub holdings: Vec<Holding>,
    pub summary: PortfolioSummary,
    pub market: Vec<MarketQuote>,
    pub notifications: Vec<Notification>,
}
