use axum::{Router, routing::get};
use crate::{AppState, controllers::guilds_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/guilds/:guild_id/config", get(guilds_controller::get_guild_config))
        .route(
            "/guilds/:guild_id/channels/:channel_id/class",
            get(guilds_controller::get_channel_class),
        )
}
