use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{StoreError, StoreResult};
use crate::models::{Alert, AlertKey, ChannelBinding, InstrumentClass};

use super::store::{AlertStore, ChannelStore};

/// Process-local store used with `ALERT_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    alerts: DashMap<AlertKey, Alert>,
    channels: DashMap<String, ChannelBinding>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn upsert(&self, alert: &Alert) -> StoreResult<()> {
        self.alerts.insert(alert.key(), alert.clone());
        Ok(())
    }

    async fn delete(&self, key: &AlertKey) -> StoreResult<u64> {
        Ok(self.alerts.remove(key).map(|_| 1).unwrap_or(0))
    }

    async fn select_by_key(&self, key: &AlertKey) -> StoreResult<Alert> {
        let found = self.alerts.get(key).map(|a| a.value().clone());
        found.ok_or(StoreError::NotFound)
    }

    async fn select_by_guild(
        &self,
        guild_id: &str,
        class: InstrumentClass,
    ) -> StoreResult<Vec<Alert>> {
        let mut items: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|e| e.key().class == class && e.value().guild_id == guild_id)
            .map(|e| e.value().clone())
            .collect();
        items.sort_by_key(|a| a.created_at);
        Ok(items)
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn upsert_binding(&self, binding: &ChannelBinding) -> StoreResult<()> {
        self.channels.insert(binding.id.clone(), binding.clone());
        Ok(())
    }

    async fn delete_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<u64> {
        let id = ChannelBinding::composite_id(guild_id, user_id);
        Ok(self.channels.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn select_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<ChannelBinding> {
        let id = ChannelBinding::composite_id(guild_id, user_id);
        let found = self.channels.get(&id).map(|b| b.value().clone());
        found.ok_or(StoreError::NotFound)
    }

    async fn select_bindings(&self, guild_id: &str) -> StoreResult<Vec<ChannelBinding>> {
        let mut items: Vec<ChannelBinding> = self
            .channels
            .iter()
            .filter(|e| e.value().guild_id == guild_id)
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
