//! Guild → alert → cancellation signal registry.
//!
//! Guild buckets are created lazily and never removed. Each bucket is its own
//! `DashMap`, so unrelated guilds never wait on each other and inserts within a
//! guild only contend on the shard that owns the key.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::models::AlertKey;

/// Handle a watcher task is told to stop through.
///
/// Clones share one underlying channel.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> CancelListener {
        CancelListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn same_channel(&self, other: &CancelSignal) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }
}

/// Receiving side held by a watcher.
#[derive(Debug)]
pub struct CancelListener {
    rx: watch::Receiver<bool>,
}

impl CancelListener {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the alert is cancelled or every signal handle is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

type GuildBucket = Arc<DashMap<AlertKey, CancelSignal>>;

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    guilds: DashMap<String, GuildBucket>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, guild_id: &str) -> GuildBucket {
        if let Some(bucket) = self.guilds.get(guild_id) {
            return Arc::clone(bucket.value());
        }

        Arc::clone(self.guilds.entry(guild_id.to_string()).or_default().value())
    }

    fn existing_bucket(&self, guild_id: &str) -> Option<GuildBucket> {
        self.guilds.get(guild_id).map(|b| Arc::clone(b.value()))
    }

    /// Returns the signal for `key`, installing a fresh one if none exists.
    ///
    /// The boolean is `true` when the signal was already registered. The test
    /// and the insert happen under the same shard lock, so concurrent callers
    /// for one key see exactly one `false`.
    pub fn get_or_create(&self, guild_id: &str, key: &AlertKey) -> (bool, CancelSignal) {
        let bucket = self.bucket(guild_id);

        match bucket.entry(key.clone()) {
            Entry::Occupied(entry) => (true, entry.get().clone()),
            Entry::Vacant(entry) => {
                let signal = CancelSignal::new();
                entry.insert(signal.clone());
                (false, signal)
            }
        }
    }

    pub fn get(&self, guild_id: &str, key: &AlertKey) -> Option<CancelSignal> {
        let bucket = self.existing_bucket(guild_id)?;
        bucket.get(key).map(|s| s.value().clone())
    }

    pub fn contains(&self, guild_id: &str, key: &AlertKey) -> bool {
        self.existing_bucket(guild_id)
            .is_some_and(|bucket| bucket.contains_key(key))
    }

    /// Drops the entry and hands back the signal that was registered, if any.
    pub fn clear(&self, guild_id: &str, key: &AlertKey) -> Option<CancelSignal> {
        let bucket = self.existing_bucket(guild_id)?;
        bucket.remove(key).map(|(_, signal)| signal)
    }

    pub fn ensure_guild(&self, guild_id: &str) {
        self.bucket(guild_id);
    }

    pub fn has_guild(&self, guild_id: &str) -> bool {
        self.guilds.contains_key(guild_id)
    }

    /// Number of live signals in a guild.
    pub fn len(&self, guild_id: &str) -> usize {
        self.existing_bucket(guild_id)
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, guild_id: &str) -> bool {
        self.len(guild_id) == 0
    }

    pub fn keys(&self, guild_id: &str) -> Vec<AlertKey> {
        self.existing_bucket(guild_id)
            .map(|bucket| bucket.iter().map(|e| e.key().clone()).collect())
            .unwrap_or_default()
    }
}
