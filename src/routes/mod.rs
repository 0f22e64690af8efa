use axum::Router;

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod alerts_routes;
pub mod guilds_routes;

/// Read-only operational endpoints. Alerts are created and removed by the
/// chat command layer, never over HTTP.
pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = guilds_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .with_state(state)
}
