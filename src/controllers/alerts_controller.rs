use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    models::{percent_gain, trailing_stop_level, Alert},
    services::market_hours,
    AppState,
};

fn alert_json(alert: &Alert, live: bool) -> serde_json::Value {
    json!({
        "alert_id": alert.alert_id,
        "class": alert.class,
        "symbol": alert.symbol,
        "channel_class": alert.channel_class,
        "caller": alert.caller,
        "starting": alert.starting,
        "extreme": alert.extreme,
        "gain_pct": percent_gain(alert, alert.extreme).map(|g| g.round_dp(2)),
        "poi": alert.poi,
        "poi_hit": alert.poi_hit,
        "stop": alert.stop,
        "trailing_stop_level": trailing_stop_level(alert),
        "contract": alert.option.as_ref().map(|c| c.to_string()),
        "created_at": alert.created_at,
        "live": live,
    })
}

// GET /guilds/:guild_id/alerts
pub async fn get_guild_alerts(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Response {
    let alerts = match state.alerts.list(&guild_id).await {
        Ok(v) => v,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("store error: {e}")).into_response();
        }
    };

    let items: Vec<serde_json::Value> = alerts
        .iter()
        .map(|a| alert_json(a, state.alerts.is_live(&guild_id, &a.key())))
        .collect();

    // prices outside the session may be stale
    let market_open = market_hours::is_trading_hours_now();

    Json(json!({
        "guild_id": guild_id,
        "market_open": market_open,
        "count": items.len(),
        "alerts": items,
    }))
    .into_response()
}
