use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::json;

use crate::{services::market_hours, AppState};

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.alerts.ping().await {
        Ok(_) => (StatusCode::OK, "store: ok".to_string()).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("store error: {}", e),
        )
            .into_response(),
    }
}

// GET /market
pub async fn market_status() -> impl IntoResponse {
    let now = Utc::now();
    Json(json!({
        "open": market_hours::is_trading_hours(now),
        "checked_at": now.timestamp(),
    }))
}
