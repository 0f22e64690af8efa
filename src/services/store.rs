use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Alert, AlertKey, ChannelBinding, InstrumentClass};

/// Alert persistence, one row per `AlertKey`.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert, or overwrite every field when the key already exists.
    async fn upsert(&self, alert: &Alert) -> StoreResult<()>;

    /// Returns the number of rows removed.
    async fn delete(&self, key: &AlertKey) -> StoreResult<u64>;

    /// `StoreError::NotFound` when absent.
    async fn select_by_key(&self, key: &AlertKey) -> StoreResult<Alert>;

    async fn select_by_guild(
        &self,
        guild_id: &str,
        class: InstrumentClass,
    ) -> StoreResult<Vec<Alert>>;

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Per-guild channel bindings, keyed by guild and user.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn upsert_binding(&self, binding: &ChannelBinding) -> StoreResult<()>;

    async fn delete_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<u64>;

    async fn select_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<ChannelBinding>;

    async fn select_bindings(&self, guild_id: &str) -> StoreResult<Vec<ChannelBinding>>;
}
