use axum::{Router, routing::get};
use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/guilds/:guild_id/alerts", get(alerts_controller::get_guild_alerts))
}
