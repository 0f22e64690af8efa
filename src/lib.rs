//! Library entrypoint for PriceSentry.
//!
//! Price alerts for chat guilds: a registry that hands out exactly one
//! cancellation signal per alert, the lifecycle that keeps it in step with the
//! alert store, an options-code codec, and a market-hours gate.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

use services::alert_lifecycle::AlertLifecycle;
use services::server_channels::ServerChannels;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub alerts: Arc<AlertLifecycle>,
    pub channels: Arc<ServerChannels>,
    pub classifier: Arc<config::ChannelClassifier>,
}
