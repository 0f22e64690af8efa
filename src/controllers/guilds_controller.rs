use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{error::ChannelError, AppState};

// GET /guilds/:guild_id/config
pub async fn get_guild_config(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Response {
    let permissions_id = match state.channels.server_permission(&guild_id).await {
        Ok(p) => p,
        Err(ChannelError::NotConfigured { .. }) => {
            return (StatusCode::NOT_FOUND, format!("guild {guild_id} is not configured"))
                .into_response();
        }
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let eod_channel_id = match state.channels.eod_channel(&guild_id).await {
        Ok(c) => c,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let alerters = match state.channels.alerters(&guild_id).await {
        Ok(v) => v,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    Json(json!({
        "guild_id": guild_id,
        "permissions_id": permissions_id,
        "eod_channel_id": eod_channel_id,
        "alerters": alerters.len(),
    }))
    .into_response()
}

// GET /guilds/:guild_id/channels/:channel_id/class
pub async fn get_channel_class(
    State(state): State<AppState>,
    Path((guild_id, channel_id)): Path<(String, String)>,
) -> Response {
    match state.classifier.classify(&guild_id, &channel_id) {
        Some(class) => Json(json!({
            "guild_id": guild_id,
            "channel_id": channel_id,
            "class": class,
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "channel is not an alert channel").into_response(),
    }
}
