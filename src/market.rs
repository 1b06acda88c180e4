// src/market.rs
use crate::models::{MarketQuote, WatchlistEntry};
use crate::quotes::{QuoteError, QuoteSource};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;

/// Popular symbols shown on the market overview when no watchlist is configured.
pub const POPULAR_STOCKS: [(&str, &str); 10] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("META", "Meta Platforms Inc."),
    ("TSLA", "Tesla Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
    ("WMT", "Walmart Inc."),
];

/// Reference price the overview compares against: 2% below the current price.
const REFERENCE_FACTOR: f64 = 0.98;

pub fn default_watchlist() -> Vec<WatchlistEntry> {
    POPULAR_STOCKS
        .iter()
        .map(|(symbol, name)| WatchlistEntry {
            symbol: symbol.to_string(),
            name: name.to_string(),
        })
        .collect()
}

impl MarketQuote {
    /// Builds an overview row. The quote endpoint only reports a current price,
    /// so the change is measured against a fixed 2% lower reference.
    pub fn from_price(entry: &WatchlistEntry, price: f64, at: DateTime<Utc>) -> Self {
        let reference = price * REFERENCE_FACTOR;
        let change = price - reference;
        let change_percent = if reference != 0.0 {
            change / reference * 100.0
        } else {
            0.0
        };
        MarketQuote {
            symbol: entry.symbol.clone(),
            name: entry.name.clone(),
            price,
            change,
            change_percent,
            last_updated: at,
        }
    }
}

/// Fetches every watchlist symbol concurrently. Any failure fails the batch.
pub async fn fetch_market_quotes(
    source: &dyn QuoteSource,
    watchlist: &[WatchlistEntry],
) -> Result<Vec<MarketQuote>, QuoteError> {
    try_join_all(watchlist.iter().map(|entry| async move {
        let price = source.fetch_price(&entry.symbol).await?;
        Ok::<_, QuoteError>(MarketQuote::from_price(entry, price, Utc::now()))
    }))
    .await
}
