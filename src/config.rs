use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::ChannelClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub servers_config: Option<PathBuf>,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "pricesentry".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let store_backend = match env::var("ALERT_STORE").as_deref() {
        Ok("memory") => StoreBackend::Memory,
        _ => StoreBackend::Mongo,
    };

    let servers_config = env::var("SERVERS_CONFIG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        store_backend,
        servers_config,
    }
}

// ---------------- Servers file ----------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlerterChannel {
    #[serde(rename = "cid")]
    pub channel_id: String,
    #[serde(rename = "uid")]
    pub user_id: String,
    #[serde(rename = "rid", default)]
    pub role_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub swings: String,
    pub day: String,
    pub watchlist: String,
    pub day_alerts: String,
    pub long_alerts: String,
    pub eod: String,
    pub premium: String,
    pub alerters: Vec<AlerterChannel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub whitelisted_ids: Vec<String>,
    #[serde(default)]
    pub alert_role: String,
}

#[derive(Debug, Deserialize)]
struct ServersFile {
    servers: Vec<ServerConfig>,
}

pub fn parse_servers(raw: &str) -> Result<Vec<ServerConfig>, ConfigError> {
    let file: ServersFile = serde_json::from_str(raw)?;
    Ok(file.servers)
}

pub fn load_servers(path: &Path) -> Result<Vec<ServerConfig>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    parse_servers(&raw)
}

/// Maps a guild's channels to the kind of alert posted there.
#[derive(Debug, Clone, Default)]
pub struct ChannelClassifier {
    servers: HashMap<String, ChannelConfig>,
}

impl ChannelClassifier {
    pub fn new(servers: &[ServerConfig]) -> Self {
        Self {
            servers: servers
                .iter()
                .map(|s| (s.id.clone(), s.channels.clone()))
                .collect(),
        }
    }

    pub fn classify(&self, guild_id: &str, channel_id: &str) -> Option<ChannelClass> {
        let channels = self.servers.get(guild_id)?;
        if channel_id.is_empty() {
            return None;
        }

        if channel_id == channels.swings {
            Some(ChannelClass::Swing)
        } else if channel_id == channels.day {
            Some(ChannelClass::Day)
        } else if channel_id == channels.watchlist {
            Some(ChannelClass::Watchlist)
        } else {
            None
        }
    }
}
