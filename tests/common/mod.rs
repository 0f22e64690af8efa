#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pricesentry::{
    config::{self, ChannelClassifier, ServerConfig},
    error::{StoreError, StoreResult},
    models::{Alert, AlertKey, ChannelBinding, InstrumentClass},
    services::{
        alert_lifecycle::AlertLifecycle,
        cancel_registry::CancellationRegistry,
        memory_store::MemoryStore,
        server_channels::ServerChannels,
        store::{AlertStore, ChannelStore},
    },
    AppState,
};

/// Wraps `MemoryStore`, counting writes and optionally failing them.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> usize {
        self.inner.alert_count()
    }
}

#[async_trait]
impl AlertStore for CountingStore {
    async fn upsert(&self, alert: &Alert) -> StoreResult<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        // give racing creators a chance to interleave
        tokio::task::yield_now().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.upsert(alert).await
    }

    async fn delete(&self, key: &AlertKey) -> StoreResult<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.delete(key).await
    }

    async fn select_by_key(&self, key: &AlertKey) -> StoreResult<Alert> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.select_by_key(key).await
    }

    async fn select_by_guild(
        &self,
        guild_id: &str,
        class: InstrumentClass,
    ) -> StoreResult<Vec<Alert>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.select_by_guild(guild_id, class).await
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        Ok(())
    }
}

/// Wraps `MemoryStore`, recording every binding written.
#[derive(Default)]
pub struct CountingChannels {
    inner: MemoryStore,
    writes: std::sync::Mutex<Vec<String>>,
    fail_reads: AtomicBool,
}

impl CountingChannels {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ids of the bindings written so far, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChannelStore for CountingChannels {
    async fn upsert_binding(&self, binding: &ChannelBinding) -> StoreResult<()> {
        self.writes.lock().unwrap().push(binding.id.clone());
        self.inner.upsert_binding(binding).await
    }

    async fn delete_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<u64> {
        self.inner.delete_binding(guild_id, user_id).await
    }

    async fn select_binding(&self, guild_id: &str, user_id: &str) -> StoreResult<ChannelBinding> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.select_binding(guild_id, user_id).await
    }

    async fn select_bindings(&self, guild_id: &str) -> StoreResult<Vec<ChannelBinding>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection refused"));
        }
        self.inner.select_bindings(guild_id).await
    }
}

pub fn lifecycle(store: Arc<CountingStore>) -> AlertLifecycle {
    AlertLifecycle::new(store, Arc::new(CancellationRegistry::new()))
}

pub const SERVERS_JSON: &str = r#"{
    "servers": [
        {
            "id": "g1",
            "channels": {
                "swings": "c-swing",
                "day": "c-day",
                "watchlist": "c-watch",
                "eod": "c-eod",
                "alerters": [{ "cid": "c-alerts", "uid": "u1", "rid": "r1" }]
            },
            "allowed_roles": ["admin"],
            "alert_role": "perm-1"
        }
    ]
}"#;

pub fn servers() -> Vec<ServerConfig> {
    config::parse_servers(SERVERS_JSON).expect("servers json")
}

pub fn test_state(store: Arc<CountingStore>, channels: Arc<CountingChannels>) -> AppState {
    let settings = config::load();

    AppState {
        settings,
        alerts: Arc::new(lifecycle(store)),
        channels: Arc::new(ServerChannels::new(channels)),
        classifier: Arc::new(ChannelClassifier::new(&servers())),
    }
}
