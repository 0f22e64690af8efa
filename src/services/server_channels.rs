use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ChannelError, ChannelResult, StoreError};
use crate::models::{ChannelBinding, SENTINEL_USER_ID};

use super::store::ChannelStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// First binding for the guild.
    Created,
    /// Permission id unchanged, nothing written.
    Unchanged,
    /// Only the sentinel was (re)written.
    SentinelUpdated,
    /// Permission id changed, every binding rewritten.
    Rewritten { bindings: usize },
}

pub struct ServerChannels {
    store: Arc<dyn ChannelStore>,
}

impl ServerChannels {
    pub fn new(store: Arc<dyn ChannelStore>) -> Self {
        Self { store }
    }

    fn backend(guild_id: &str, op: &'static str, source: StoreError) -> ChannelError {
        warn!(guild = guild_id, op, error = %source, "channel store call failed");
        ChannelError::Backend {
            guild_id: guild_id.to_string(),
            op,
            source,
        }
    }

    async fn bindings(&self, guild_id: &str) -> ChannelResult<Vec<ChannelBinding>> {
        self.store
            .select_bindings(guild_id)
            .await
            .map_err(|e| Self::backend(guild_id, "select_bindings", e))
    }

    async fn write(&self, binding: &ChannelBinding) -> ChannelResult<()> {
        self.store
            .upsert_binding(binding)
            .await
            .map_err(|e| Self::backend(&binding.guild_id, "upsert_binding", e))
    }

    /// Records the guild's permission id and end-of-day channel.
    ///
    /// A changed permission id is applied to every binding of the guild, not
    /// just the sentinel.
    pub async fn initialise_server(
        &self,
        guild_id: &str,
        permission_id: &str,
        eod_channel_id: &str,
    ) -> ChannelResult<InitOutcome> {
        let bindings = self.bindings(guild_id).await?;

        if bindings.is_empty() {
            self.write(&ChannelBinding::sentinel(guild_id, permission_id, eod_channel_id))
                .await?;
            info!(guild = guild_id, "server initialised");
            return Ok(InitOutcome::Created);
        }

        if bindings.iter().any(|b| b.permissions_id != permission_id) {
            let mut rewritten = 0;
            let mut saw_sentinel = false;

            for mut binding in bindings {
                saw_sentinel |= binding.is_sentinel();
                binding.permissions_id = permission_id.to_string();
                binding.eod_channel_id = eod_channel_id.to_string();
                self.write(&binding).await?;
                rewritten += 1;
            }
            if !saw_sentinel {
                self.write(&ChannelBinding::sentinel(guild_id, permission_id, eod_channel_id))
                    .await?;
                rewritten += 1;
            }

            info!(guild = guild_id, rewritten, "permission id changed, bindings rewritten");
            return Ok(InitOutcome::Rewritten {
                bindings: rewritten,
            });
        }

        let sentinel_current = bindings
            .iter()
            .any(|b| b.is_sentinel() && b.eod_channel_id == eod_channel_id);
        if sentinel_current {
            return Ok(InitOutcome::Unchanged);
        }

        self.write(&ChannelBinding::sentinel(guild_id, permission_id, eod_channel_id))
            .await?;
        Ok(InitOutcome::SentinelUpdated)
    }

    async fn sentinel(&self, guild_id: &str) -> ChannelResult<ChannelBinding> {
        match self.store.select_binding(guild_id, SENTINEL_USER_ID).await {
            Ok(binding) => Ok(binding),
            Err(StoreError::NotFound) => Err(ChannelError::NotConfigured {
                guild_id: guild_id.to_string(),
            }),
            Err(e) => Err(Self::backend(guild_id, "select_binding", e)),
        }
    }

    pub async fn server_permission(&self, guild_id: &str) -> ChannelResult<String> {
        Ok(self.sentinel(guild_id).await?.permissions_id)
    }

    pub async fn eod_channel(&self, guild_id: &str) -> ChannelResult<String> {
        Ok(self.sentinel(guild_id).await?.eod_channel_id)
    }

    // ---------------- Alerters ----------------

    /// Binds a user's alerts to a channel, inheriting the guild-wide settings.
    pub async fn create_alerter(
        &self,
        guild_id: &str,
        channel_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> ChannelResult<ChannelBinding> {
        let mut binding = ChannelBinding::new(guild_id, user_id, role_id, channel_id);

        match self.sentinel(guild_id).await {
            Ok(sentinel) => {
                binding.permissions_id = sentinel.permissions_id;
                binding.eod_channel_id = sentinel.eod_channel_id;
            }
            Err(ChannelError::NotConfigured { .. }) => {}
            Err(e) => return Err(e),
        }

        self.write(&binding).await?;
        Ok(binding)
    }

    pub async fn remove_alerter(&self, guild_id: &str, user_id: &str) -> ChannelResult<()> {
        let deleted = self
            .store
            .delete_binding(guild_id, user_id)
            .await
            .map_err(|e| Self::backend(guild_id, "delete_binding", e))?;

        if deleted == 0 {
            return Err(ChannelError::NotFound {
                guild_id: guild_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_alerter(&self, guild_id: &str, user_id: &str) -> ChannelResult<ChannelBinding> {
        match self.store.select_binding(guild_id, user_id).await {
            Ok(binding) => Ok(binding),
            Err(StoreError::NotFound) => Err(ChannelError::NotFound {
                guild_id: guild_id.to_string(),
                user_id: user_id.to_string(),
            }),
            Err(e) => Err(Self::backend(guild_id, "select_binding", e)),
        }
    }

    /// Every binding except the sentinel.
    pub async fn alerters(&self, guild_id: &str) -> ChannelResult<Vec<ChannelBinding>> {
        let mut bindings = self.bindings(guild_id).await?;
        bindings.retain(|b| !b.is_sentinel());
        Ok(bindings)
    }
}
