// Drives the warp routes end to end against a scripted quote source.

use async_trait::async_trait;
use portfolio_tracker::api;
use portfolio_tracker::dashboard::{Dashboard, FETCH_STOCKS_FAILED};
use portfolio_tracker::market::default_watchlist;
use portfolio_tracker::models::{Holding, MarketQuote, Notification, PortfolioSummary};
use portfolio_tracker::quotes::{QuoteError, QuoteSource};
use portfolio_tracker::storage::{HoldingStore, DEFAULT_STORAGE_KEY};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use warp::http::StatusCode;

/// Every symbol costs `price` unless it has been marked as failing.
struct ScriptedQuotes {
    price: f64,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedQuotes {
    fn new(price: f64) -> Arc<Self> {
        Arc::new(ScriptedQuotes {
            price,
            failing: Mutex::new(HashSet::new()),
        })
    }

    fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(symbol.to_string());
    }
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(QuoteError::Status {
                symbol: symbol.to_string(),
                status: 500,
            });
        }
        Ok(self.price)
    }
}

fn setup(quotes: Arc<ScriptedQuotes>) -> (TempDir, Arc<Dashboard>) {
    let dir = TempDir::new().unwrap();
    let store = HoldingStore::open(dir.path().join("storage.json"), DEFAULT_STORAGE_KEY).unwrap();
    let dashboard = Arc::new(Dashboard::new(store, quotes, default_watchlist()));
    (dir, dashboard)
}

async fn post_holding(dashboard: &Arc<Dashboard>, body: Value) -> Holding {
    let filter = api::routes(dashboard.clone());
    let resp = warp::test::request()
        .method("POST")
        .path("/holdings")
        .json(&body)
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    serde_json::from_slice(resp.body()).unwrap()
}

#[tokio::test]
async fn add_holding_returns_created_record() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(120.0));

    let holding = post_holding(
        &dashboard,
        json!({"symbol": "nvda", "name": "NVIDIA", "quantity": 2.0, "purchase_price": 100.0}),
    )
    .await;

    assert_eq!(holding.symbol, "NVDA");
    assert_eq!(holding.name, "NVIDIA");
    assert!(!holding.id.is_empty());

    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("GET")
        .path("/holdings")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Holding> = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, holding.id);
    assert_eq!(listed[0].current_price, Some(120.0));
}

#[tokio::test]
async fn summary_reports_totals() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(150.0));
    post_holding(
        &dashboard,
        json!({"symbol": "AAPL", "name": "Apple", "quantity": 10.0, "purchase_price": 100.0}),
    )
    .await;

    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("GET")
        .path("/summary")
        .reply(&filter)
        .await;
    let summary: PortfolioSummary = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(summary.total_investment, 1000.0);
    assert_eq!(summary.total_value, 1500.0);
    assert_eq!(summary.total_return, 500.0);
    assert_eq!(summary.return_percentage, 50.0);
}

#[tokio::test]
async fn empty_portfolio_summary_has_zero_percentage() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("GET")
        .path("/summary")
        .reply(&filter)
        .await;
    let summary: PortfolioSummary = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(summary, PortfolioSummary::default());
}

#[tokio::test]
async fn delete_holding_then_unknown_is_404() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    let keep = post_holding(
        &dashboard,
        json!({"symbol": "V", "name": "Visa", "quantity": 1.0, "purchase_price": 1.0}),
    )
    .await;
    let gone = post_holding(
        &dashboard,
        json!({"symbol": "WMT", "name": "Walmart", "quantity": 1.0, "purchase_price": 1.0}),
    )
    .await;

    let filter = api::routes(dashboard.clone());
    let resp = warp::test::request()
        .method("DELETE")
        .path(&format!("/holdings/{}", gone.id))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let remaining = dashboard.holdings().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);

    let resp = warp::test::request()
        .method("DELETE")
        .path(&format!("/holdings/{}", gone.id))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains(&gone.id));
}

#[tokio::test]
async fn update_unknown_holding_is_404() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("PUT")
        .path("/holdings/nope")
        .json(&json!({
            "id": "nope", "symbol": "AAPL", "name": "Apple",
            "quantity": 1.0, "purchase_price": 1.0
        }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("POST")
        .path("/holdings")
        .json(&json!({"symbol": "AAPL"}))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_keeps_previous_data_when_a_quote_fails() {
    let quotes = ScriptedQuotes::new(50.0);
    let (_dir, dashboard) = setup(quotes.clone());
    post_holding(
        &dashboard,
        json!({"symbol": "AAPL", "name": "Apple", "quantity": 1.0, "purchase_price": 40.0}),
    )
    .await;
    post_holding(
        &dashboard,
        json!({"symbol": "TSLA", "name": "Tesla", "quantity": 2.0, "purchase_price": 40.0}),
    )
    .await;
    let before = dashboard.holdings().await;

    quotes.fail("TSLA");
    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("GET")
        .path("/dashboard")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    let holdings: Vec<Holding> = serde_json::from_value(body["holdings"].clone()).unwrap();
    assert_eq!(holdings, before);
    assert_eq!(body["summary"]["total_value"], json!(150.0));

    let notes: Vec<Notification> =
        serde_json::from_value(body["notifications"].clone()).unwrap();
    assert_eq!(notes.last().unwrap().message, FETCH_STOCKS_FAILED);
}

#[tokio::test]
async fn market_refresh_populates_watchlist() {
    let quotes = ScriptedQuotes::new(100.0);
    let (_dir, dashboard) = setup(quotes.clone());
    let filter = api::routes(dashboard);

    let resp = warp::test::request()
        .method("POST")
        .path("/market/refresh")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refreshed: Vec<MarketQuote> = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(refreshed.len(), 10);

    quotes.fail("META");
    let resp = warp::test::request()
        .method("POST")
        .path("/market/refresh")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let resp = warp::test::request()
        .method("GET")
        .path("/market")
        .reply(&filter)
        .await;
    let shown: Vec<MarketQuote> = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(shown.len(), refreshed.len());
    for (now, then) in shown.iter().zip(&refreshed) {
        assert_eq!(now.symbol, then.symbol);
        assert_eq!(now.price, then.price);
        assert_eq!(now.last_updated, then.last_updated);
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    let filter = api::routes(dashboard);
    let resp = warp::test::request()
        .method("GET")
        .path("/nowhere")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn failed_storage_write_is_500() {
    let (dir, dashboard) = setup(ScriptedQuotes::new(1.0));
    std::fs::create_dir(dir.path().join("storage.tmp")).unwrap();

    let filter = api::routes(dashboard.clone());
    let resp = warp::test::request()
        .method("POST")
        .path("/holdings")
        .json(&json!({"symbol": "AAPL", "name": "Apple", "quantity": 1.0, "purchase_price": 1.0}))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("storage"));
    assert!(dashboard.holdings().await.is_empty());
}

#[tokio::test]
async fn update_body_may_omit_id() {
    let (_dir, dashboard) = setup(ScriptedQuotes::new(30.0));
    let added = post_holding(
        &dashboard,
        json!({"symbol": "JPM", "name": "JPMorgan", "quantity": 1.0, "purchase_price": 20.0}),
    )
    .await;

    let filter = api::routes(dashboard.clone());
    let resp = warp::test::request()
        .method("PUT")
        .path(&format!("/holdings/{}", added.id))
        .json(&json!({"symbol": "JPM", "name": "JPMorgan", "quantity": 3.0, "purchase_price": 20.0}))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: Holding = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(saved.id, added.id);
    assert_eq!(dashboard.holdings().await[0].quantity, 3.0);
}
