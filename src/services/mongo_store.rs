use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOptions, ReplaceOptions};
use mongodb::{Collection, Database};

use crate::error::{StoreError, StoreResult};
use crate::models::{Alert, AlertKey, ChannelBinding, InstrumentClass};

use super::store::{AlertStore, ChannelStore};

pub const CHANNELS: &str = "channels";

/// One collection per instrument class.
pub fn collection_name(class: InstrumentClass) -> &'static str {
    match class {
        InstrumentClass::Stock => "stocks",
        InstrumentClass::Short => "shorts",
        InstrumentClass::Option => "options",
        InstrumentClass::Crypto => "crypto",
    }
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn alerts(&self, class: InstrumentClass) -> Collection<Alert> {
        self.db.collection::<Alert>(collection_name(class))
    }

    fn channels(&self) -> Collection<ChannelBinding> {
        self.db.collection::<ChannelBinding>(CHANNELS)
    }
}

fn upsert_opts() -> ReplaceOptions {
    ReplaceOptions::builder().upsert(true).build()
}

#[async_trait]
impl AlertStore for MongoStore {
    async fn upsert(&self, alert: &Alert) -> StoreResult<()> {
        self.alerts(alert.class)
            .replace_one(doc! { "_id": &alert.alert_id }, alert, upsert_opts())
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &AlertKey) -> StoreResult<u64> {
        let res = self
            .alerts(key.class)
            .delete_one(doc! { "_id": &key.alert_id }, None)
            .await?;
        Ok(res.deleted_count)
    }

    async fn select_by_key(&self, key: &AlertKey) -> StoreResult<Alert> {
        self.alerts(key.class)
            .find_one(doc! { "_id": &key.alert_id }, None)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn select_by_guild(
        &self,
        guild_id: &str,
        class: InstrumentClass,
    ) -> StoreResult<Vec<Alert>> {
        let find_opts = FindOptions::builder().sort(doc! { "created_at": 1 }).build();

        let mut cursor = self
            .alerts(class)
            .find(doc! { "guild_id": guild_id }, find_opts)
            .await?;

        let mut items: Vec<Alert> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[async_trait]
impl ChannelStore for MongoStore {
    async fn upsert_binding(&self, binding: &ChannelBinding) -> StoreResult<()> {
        self.channels()
            .replace_one(doc! { "_id": &binding.id }, binding, upsert_opts())
            .await?;
        Ok(())
    }

    async fn delete_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<u64> {
        let id = ChannelBinding::composite_id(guild_id, user_id);
        let res = self.channels().delete_one(doc! { "_id": id }, None).await?;
        Ok(res.deleted_count)
    }

    async fn select_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<ChannelBinding> {
        let id = ChannelBinding::composite_id(guild_id, user_id);
        self.channels()
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn select_bindings(&self, guild_id: &str) -> StoreResult<Vec<ChannelBinding>> {
        let mut cursor = self
            .channels()
            .find(doc! { "guild_id": guild_id }, None)
            .await?;

        let mut items: Vec<ChannelBinding> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?);
        }

        Ok(items)
    }
}
