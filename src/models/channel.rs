use serde::{Deserialize, Serialize};

/// Reserved user id of the guild-wide binding.
pub const SENTINEL_USER_ID: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    // "{user_id}_{guild_id}"
    #[serde(rename = "_id")]
    pub id: String,

    pub guild_id: String,
    pub user_id: String,
    pub role_id: String,
    pub channel_id: String,
    pub permissions_id: String,
    pub eod_channel_id: String,
}

impl ChannelBinding {
    pub fn composite_id(guild_id: &str, user_id: &str) -> String {
        format!("{user_id}_{guild_id}")
    }

    pub fn new(guild_id: &str, user_id: &str, role_id: &str, channel_id: &str) -> Self {
        Self {
            id: Self::composite_id(guild_id, user_id),
            guild_id: guild_id.to_string(),
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
            channel_id: channel_id.to_string(),
            permissions_id: String::new(),
            eod_channel_id: String::new(),
        }
    }

    pub fn sentinel(guild_id: &str, permissions_id: &str, eod_channel_id: &str) -> Self {
        Self {
            permissions_id: permissions_id.to_string(),
            eod_channel_id: eod_channel_id.to_string(),
            ..Self::new(guild_id, SENTINEL_USER_ID, "", "")
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.user_id == SENTINEL_USER_ID
    }
}
