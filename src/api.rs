// src/api.rs
use crate::dashboard::Dashboard;
use crate::error::ApiError;
use crate::models::{Holding, NewHolding};
use log::{error, info};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub fn routes(
    dashboard: Arc<Dashboard>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let overview = warp::path!("dashboard")
        .and(warp::get())
        .and(with_dashboard(dashboard.clone()))
        .and_then(dashboard_handler);

    let list = warp::path!("holdings")
        .and(warp::get())
        .and(with_dashboard(dashboard.clone()))
        .and_then(list_holdings_handler);

    let add = warp::path!("holdings")
        .and(warp::post())
        .and(with_dashboard(dashboard.clone()))
        .and(warp::body::json())
        .and_then(add_holding_handler);

    let update = warp::path!("holdings" / String)
        .and(warp::put())
        .and(with_dashboard(dashboard.clone()))
        .and(warp::body::json())
        .and_then(update_holding_handler);

    let delete = warp::path!("holdings" / String)
        .and(warp::delete())
        .and(with_dashboard(dashboard.clone()))
        .and_then(delete_holding_handler);

    let summary = warp::path!("summary")
        .and(warp::get())
        .and(with_dashboard(dashboard.clone()))
        .and_then(summary_handler);

    let market = warp::path!("market")
        .and(warp::get())
        .and(with_dashboard(dashboard.clone()))
        .and_then(market_handler);

    let refresh_market = warp::path!("market" / "refresh")
        .and(warp::post())
        .and(with_dashboard(dashboard.clone()))
        .and_then(refresh_market_handler);

    let notifications = warp::path!("notifications")
        .and(warp::get())
        .and(with_dashboard(dashboard))
        .and_then(notifications_handler);

    overview
        .or(list)
        .or(add)
        .or(update)
        .or(delete)
        .or(summary)
        .or(market)
        .or(refresh_market)
        .or(notifications)
        .recover(handle_rejection)
}

fn with_dashboard(
    dashboard: Arc<Dashboard>,
) -> impl Filter<Extract = (Arc<Dashboard>,), Error = Infallible> + Clone {
    warp::any().map(move || dashboard.clone())
}

/// Reloads holdings with fresh prices and returns the whole view. A failed
/// reload is already recorded as a notification, so the previous view is
/// returned as-is.
async fn dashboard_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    let _ = dashboard.load_holdings().await;
    Ok(warp::reply::json(&dashboard.snapshot().await))
}

async fn list_holdings_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dashboard.holdings().await))
}

async fn add_holding_handler(
    dashboard: Arc<Dashboard>,
    new_holding: NewHolding,
) -> Result<impl Reply, Rejection> {
    let holding = dashboard
        .add_holding(new_holding)
        .await
        .map_err(warp::reject::custom)?;
    info!("Holding {} added", holding.id);
    Ok(warp::reply::with_status(
        warp::reply::json(&holding),
        StatusCode::CREATED,
    ))
}

async fn update_holding_handler(
    id: String,
    dashboard: Arc<Dashboard>,
    holding: Holding,
) -> Result<impl Reply, Rejection> {
    let holding = dashboard
        .update_holding(&id, holding)
        .await
        .map_err(warp::reject::custom)?;
    info!("Holding {} updated", id);
    Ok(warp::reply::json(&holding))
}

async fn delete_holding_handler(
    id: String,
    dashboard: Arc<Dashboard>,
) -> Result<impl Reply, Rejection> {
    dashboard
        .delete_holding(&id)
        .await
        .map_err(warp::reject::custom)?;
    info!("Holding {} deleted", id);
    Ok(warp::reply::json(&json!({ "deleted": id })))
}

async fn summary_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dashboard.summary().await))
}

async fn market_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dashboard.market().await))
}

async fn refresh_market_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    let quotes = dashboard
        .refresh_market()
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&quotes))
}

async fn notifications_handler(dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&dashboard.notifications().await))
}

/// Turns rejections into `{ "error": ... }` bodies with a matching status.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(api_err) = err.find::<ApiError>() {
        (api_err.status(), api_err.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
