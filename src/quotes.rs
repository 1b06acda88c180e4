// src/quotes.rs
use crate::config::{QuoteProvider, QuotesConfig};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request for {symbol} failed: {source}")]
    Http {
        symbol: String,
        source: reqwest::Error,
    },

    #[error("quote provider returned HTTP {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("malformed quote response for {symbol}: {message}")]
    Malformed { symbol: String, message: String },
}

/// Something that can report the current price of a ticker symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}

#[derive(Deserialize)]
struct FinnhubQuote {
    /// Current price.
    c: f64,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: String,
}

#[derive(Deserialize)]
struct AlphaVantageResponse {
    #[serde(rename = "Global Quote")]
    global_quote: GlobalQuote,
}

pub fn parse_finnhub_quote(symbol: &str, body: &str) -> Result<f64, QuoteError> {
    serde_json::from_str::<FinnhubQuote>(body)
        .map(|q| q.c)
        .map_err(|e| QuoteError::Malformed {
            symbol: symbol.to_string(),
            message: e.to_string(),
        })
}

pub fn parse_alpha_vantage_quote(symbol: &str, body: &str) -> Result<f64, QuoteError> {
    let malformed = |message: String| QuoteError::Malformed {
        symbol: symbol.to_string(),
        message,
    };
    let response: AlphaVantageResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let raw = response.global_quote.price;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| malformed(format!("price {raw:?}: {e}")))
}

/// Sends the request and hands back the body of a successful response.
async fn get_body(request: RequestBuilder, symbol: &str) -> Result<String, QuoteError> {
    let http_err = |source: reqwest::Error| QuoteError::Http {
        symbol: symbol.to_string(),
        source,
    };
    let response = request.send().await.map_err(http_err)?;
    if !response.status().is_success() {
        error!(
            "Failed to fetch quote for {}: HTTP {}",
            symbol,
            response.status()
        );
        return Err(QuoteError::Status {
            symbol: symbol.to_string(),
            status: response.status().as_u16(),
        });
    }
    response.text().await.map_err(http_err)
}

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        FinnhubClient {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, symbol: &str) -> RequestBuilder {
        let url = format!("{}/quote", self.base_url.trim_end_matches('/'));
        self.client
            .get(url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        debug!("Fetching Finnhub quote for {}", symbol);
        let body = get_body(self.request(symbol), symbol).await?;
        parse_finnhub_quote(symbol, &body)
    }
}

pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        AlphaVantageClient {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, symbol: &str) -> RequestBuilder {
        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        self.client.get(url).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ])
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        debug!("Fetching Alpha Vantage quote for {}", symbol);
        let body = get_body(self.request(symbol), symbol).await?;
        parse_alpha_vantage_quote(symbol, &body)
    }
}

/// Builds the client for the configured provider.
pub fn build_source(config: &QuotesConfig, client: Client) -> Arc<dyn QuoteSource> {
    match config.provider {
        QuoteProvider::Finnhub => Arc::new(FinnhubClient::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
        )),
        QuoteProvider::AlphaVantage => Arc::new(AlphaVantageClient::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
        )),
    }
}
