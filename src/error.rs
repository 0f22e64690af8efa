use thiserror::Error;

use crate::models::InstrumentClass;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type StoreResult<T> = Result<T, StoreError>;
pub type AlertResult<T> = Result<T, AlertError>;
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Failures reported by a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,

    #[error("backend failure: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Errors surfaced by the alert lifecycle.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("invalid {class} alert {alert_id}: {reason}")]
    Validation {
        class: InstrumentClass,
        alert_id: String,
        reason: String,
    },

    #[error("{class} alert {alert_id} not found")]
    NotFound {
        class: InstrumentClass,
        alert_id: String,
    },

    #[error("{class} alert {alert_id}: store {op} failed")]
    Backend {
        class: InstrumentClass,
        alert_id: String,
        op: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{class} alerts of guild {guild_id}: store {op} failed")]
    GuildBackend {
        class: InstrumentClass,
        guild_id: String,
        op: &'static str,
        #[source]
        source: StoreError,
    },

    /// The row exists but nothing is watching it. Recreate the alert.
    #[error("{class} alert {alert_id} has no live watcher, recreate the alert")]
    OrphanState {
        class: InstrumentClass,
        alert_id: String,
    },
}

impl AlertError {
    pub fn class(&self) -> InstrumentClass {
        match self {
            AlertError::Validation { class, .. }
            | AlertError::NotFound { class, .. }
            | AlertError::Backend { class, .. }
            | AlertError::GuildBackend { class, .. }
            | AlertError::OrphanState { class, .. } => *class,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AlertError::NotFound { .. })
    }

    pub fn is_orphan(&self) -> bool {
        matches!(self, AlertError::OrphanState { .. })
    }
}

/// Errors surfaced by the per-guild channel configuration.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("guild {guild_id} has no channel configuration")]
    NotConfigured { guild_id: String },

    #[error("no channel binding for user {user_id} in guild {guild_id}")]
    NotFound { guild_id: String, user_id: String },

    #[error("channel store {op} failed for guild {guild_id}")]
    Backend {
        guild_id: String,
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsCodeError {
    #[error("options code {code:?} must be 16 to 19 characters, got {len}")]
    InvalidLength { code: String, len: usize },

    #[error("options code {code:?} has an unparseable strike {raw:?}")]
    InvalidStrike { code: String, raw: String },

    #[error("options code {code:?} has an unknown contract type {raw:?}")]
    InvalidContractType { code: String, raw: String },

    #[error("invalid option {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read servers config: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse servers config: {0}")]
    Json(#[from] serde_json::Error),
}
