//! Create/remove/get/mutate for every instrument class.
//!
//! The registry is always consulted before the store. There is no transaction
//! spanning the two: a crash between registering a signal and writing the row
//! (or between deleting the row and clearing the signal) leaves them out of
//! step. `get` reports a stored row with no signal as `OrphanState`.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{AlertError, AlertResult, StoreError};
use crate::models::{Alert, AlertKey, ChannelClass, InstrumentClass, OptionContract};

use super::cancel_registry::{CancelSignal, CancellationRegistry};
use super::options_code;
use super::store::AlertStore;

/// Parameters of an alert about to be created.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub guild_id: String,
    pub alert_id: Option<String>,
    pub class: InstrumentClass,
    pub symbol: String,
    pub channel_class: ChannelClass,
    pub caller: String,
    pub starting: Decimal,
    pub poi: Option<Decimal>,
    pub stop: Option<Decimal>,
    pub trailing_stop: Option<Decimal>,
    pub scale_target: Option<Decimal>,
    pub exit_target: Option<Decimal>,
    pub expiry: Option<i64>,
    pub option: Option<OptionContract>,
    pub underlying_starting: Option<Decimal>,
}

impl NewAlert {
    fn base(
        class: InstrumentClass,
        guild_id: &str,
        symbol: &str,
        caller: &str,
        starting: Decimal,
    ) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            alert_id: None,
            class,
            symbol: symbol.to_string(),
            channel_class: ChannelClass::Swing,
            caller: caller.to_string(),
            starting,
            poi: None,
            stop: None,
            trailing_stop: None,
            scale_target: None,
            exit_target: None,
            expiry: None,
            option: None,
            underlying_starting: None,
        }
    }

    pub fn stock(guild_id: &str, ticker: &str, caller: &str, starting: Decimal) -> Self {
        Self::base(InstrumentClass::Stock, guild_id, ticker, caller, starting)
    }

    pub fn short(guild_id: &str, ticker: &str, caller: &str, starting: Decimal) -> Self {
        Self::base(InstrumentClass::Short, guild_id, ticker, caller, starting)
    }

    pub fn crypto(guild_id: &str, coin: &str, caller: &str, starting: Decimal) -> Self {
        Self::base(InstrumentClass::Crypto, guild_id, coin, caller, starting)
    }

    /// The symbol is filled in from the encoded contract.
    pub fn option(
        guild_id: &str,
        contract: OptionContract,
        caller: &str,
        starting: Decimal,
    ) -> Self {
        let mut new = Self::base(InstrumentClass::Option, guild_id, "", caller, starting);
        new.option = Some(contract);
        new
    }

    pub fn with_id(mut self, alert_id: impl Into<String>) -> Self {
        self.alert_id = Some(alert_id.into());
        self
    }

    pub fn with_channel_class(mut self, channel_class: ChannelClass) -> Self {
        self.channel_class = channel_class;
        self
    }

    pub fn with_poi(mut self, poi: Decimal) -> Self {
        self.poi = Some(poi);
        self
    }

    pub fn with_stop(mut self, stop: Decimal) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_trailing_stop(mut self, offset: Decimal) -> Self {
        self.trailing_stop = Some(offset);
        self
    }

    pub fn with_targets(mut self, scale: Option<Decimal>, exit: Option<Decimal>) -> Self {
        self.scale_target = scale;
        self.exit_target = exit;
        self
    }

    pub fn with_expiry(mut self, expiry: i64) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_underlying_starting(mut self, price: Decimal) -> Self {
        self.underlying_starting = Some(price);
        self
    }

    /// Validates and builds the stored record. Runs before any I/O.
    fn into_alert(self, now: i64) -> AlertResult<Alert> {
        let class = self.class;
        let label = self
            .alert_id
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.symbol, self.guild_id));
        let invalid = |reason: String| AlertError::Validation {
            class,
            alert_id: label.clone(),
            reason,
        };

        if self.guild_id.trim().is_empty() {
            return Err(invalid("guild id is empty".into()));
        }
        if self.alert_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(invalid("alert id is empty".into()));
        }
        if self.starting <= Decimal::ZERO {
            return Err(invalid(format!(
                "starting price must be above zero, got {}",
                self.starting
            )));
        }

        let optional = [
            ("point of interest", self.poi),
            ("stop", self.stop),
            ("scale target", self.scale_target),
            ("exit target", self.exit_target),
            ("underlying starting price", self.underlying_starting),
        ];
        for (name, value) in optional {
            if value.is_some_and(|v| v.is_sign_negative()) {
                return Err(invalid(format!("{name} cannot be negative")));
            }
        }
        if self.trailing_stop.is_some_and(|v| v <= Decimal::ZERO) {
            return Err(invalid("trailing stop offset must be above zero".into()));
        }

        let (symbol, option) = match (class, self.option) {
            (InstrumentClass::Option, Some(contract)) => {
                let contract = normalise_contract(contract).map_err(invalid)?;
                let code = options_code::encode(&contract).map_err(|e| invalid(e.to_string()))?;
                (code, Some(contract))
            }
            (InstrumentClass::Option, None) => {
                return Err(invalid("option alerts need a contract".into()));
            }
            (_, Some(_)) => {
                return Err(invalid("only option alerts carry a contract".into()));
            }
            (_, None) => {
                let symbol = self.symbol.trim().to_uppercase();
                if symbol.is_empty() {
                    return Err(invalid("symbol is empty".into()));
                }
                (symbol, None)
            }
        };

        let key = match self.alert_id {
            Some(id) => AlertKey::new(class, id),
            None => AlertKey::derived(class, &self.guild_id, &symbol),
        };

        Ok(Alert {
            alert_id: key.alert_id,
            guild_id: self.guild_id,
            symbol,
            class,
            channel_class: self.channel_class,
            starting: self.starting,
            extreme: self.starting,
            last_extreme: self.starting,
            poi: self.poi,
            poi_hit: false,
            stop: self.stop,
            trailing_stop: self.trailing_stop,
            scale_target: self.scale_target,
            exit_target: self.exit_target,
            expiry: self.expiry,
            option,
            underlying_starting: self.underlying_starting,
            caller: self.caller,
            created_at: now,
        })
    }
}

fn normalise_contract(mut contract: OptionContract) -> Result<OptionContract, String> {
    if contract.expiry_year.len() != 4 {
        return Err("year is incorrect".into());
    }
    if contract.expiry_month.is_empty() || contract.expiry_month.len() > 2 {
        return Err("month is incorrect".into());
    }
    if contract.expiry_day.is_empty() || contract.expiry_day.len() > 2 {
        return Err("day is incorrect".into());
    }

    if contract.expiry_month.len() == 1 {
        contract.expiry_month.insert(0, '0');
    }
    if contract.expiry_day.len() == 1 {
        contract.expiry_day.insert(0, '0');
    }
    contract.ticker = contract.ticker.to_uppercase();
    Ok(contract)
}

/// Result of a create call.
#[derive(Debug, Clone)]
pub struct CreatedAlert {
    pub key: AlertKey,
    pub signal: CancelSignal,
    /// `true` when a watcher was already registered and nothing was written.
    pub already_existed: bool,
}

pub struct AlertLifecycle {
    store: Arc<dyn AlertStore>,
    registry: Arc<CancellationRegistry>,
}

impl AlertLifecycle {
    pub fn new(store: Arc<dyn AlertStore>, registry: Arc<CancellationRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    fn store_failure(key: &AlertKey, op: &'static str, source: StoreError) -> AlertError {
        match source {
            StoreError::NotFound => AlertError::NotFound {
                class: key.class,
                alert_id: key.alert_id.clone(),
            },
            source => {
                warn!(alert = %key, op, error = %source, "alert store call failed");
                AlertError::Backend {
                    class: key.class,
                    alert_id: key.alert_id.clone(),
                    op,
                    source,
                }
            }
        }
    }

    fn invalid(key: &AlertKey, reason: impl Into<String>) -> AlertError {
        AlertError::Validation {
            class: key.class,
            alert_id: key.alert_id.clone(),
            reason: reason.into(),
        }
    }

    /// Registers a cancellation signal and persists the alert.
    ///
    /// A second create for a key that already has a signal returns that
    /// signal with `already_existed = true` and does not touch the store.
    /// When the write fails the signal stays registered, so the caller can
    /// retry by creating again.
    pub async fn create(&self, new: NewAlert) -> AlertResult<CreatedAlert> {
        let alert = new.into_alert(Utc::now().timestamp())?;
        let key = alert.key();

        let (existed, signal) = self.registry.get_or_create(&alert.guild_id, &key);
        if existed {
            debug!(guild = %alert.guild_id, alert = %key, "alert already watched, skipping write");
            return Ok(CreatedAlert {
                key,
                signal,
                already_existed: true,
            });
        }

        if let Err(source) = self.store.upsert(&alert).await {
            warn!(
                guild = %alert.guild_id,
                alert = %key,
                error = %source,
                "unable to persist alert, signal left registered"
            );
            return Err(AlertError::Backend {
                class: key.class,
                alert_id: key.alert_id.clone(),
                op: "upsert",
                source,
            });
        }

        info!(guild = %alert.guild_id, alert = %key, symbol = %alert.symbol, "alert created");
        Ok(CreatedAlert {
            key,
            signal,
            already_existed: false,
        })
    }

    /// Deletes the row and releases the signal.
    ///
    /// Zero rows deleted is `NotFound`. The registry entry is cleared on
    /// success and on `NotFound`, and kept on a backend failure because the row
    /// may still be there. A row stored under another guild is refused before
    /// anything is deleted, so the signal is always cleared from the bucket
    /// the row belongs to.
    pub async fn remove(&self, guild_id: &str, key: &AlertKey) -> AlertResult<()> {
        match self.store.select_by_key(key).await {
            Ok(alert) if alert.guild_id != guild_id => {
                warn!(
                    guild = guild_id,
                    owner = %alert.guild_id,
                    alert = %key,
                    "remove from another guild refused"
                );
                return Err(Self::invalid(
                    key,
                    format!("alert belongs to guild {}", alert.guild_id),
                ));
            }
            Ok(_) | Err(StoreError::NotFound) => {}
            Err(source) => return Err(Self::store_failure(key, "select", source)),
        }

        let deleted = match self.store.delete(key).await {
            Ok(n) => n,
            Err(StoreError::NotFound) => 0,
            Err(source) => return Err(Self::store_failure(key, "delete", source)),
        };

        if let Some(signal) = self.registry.clear(guild_id, key) {
            signal.cancel();
        }

        if deleted == 0 {
            debug!(guild = guild_id, alert = %key, "remove matched no rows");
            return Err(AlertError::NotFound {
                class: key.class,
                alert_id: key.alert_id.clone(),
            });
        }

        info!(guild = guild_id, alert = %key, "alert removed");
        Ok(())
    }

    /// Loads a stored alert that has a live watcher.
    pub async fn get(&self, key: &AlertKey) -> AlertResult<Alert> {
        let alert = self
            .store
            .select_by_key(key)
            .await
            .map_err(|e| Self::store_failure(key, "select", e))?;

        if !self.registry.contains(&alert.guild_id, key) {
            warn!(
                guild = %alert.guild_id,
                alert = %key,
                "stored alert has no cancellation signal, recreate it"
            );
            return Err(AlertError::OrphanState {
                class: key.class,
                alert_id: key.alert_id.clone(),
            });
        }

        Ok(alert)
    }

    async fn modify<F>(&self, key: &AlertKey, change: F) -> AlertResult<Alert>
    where
        F: FnOnce(&mut Alert) -> AlertResult<bool>,
    {
        let mut alert = self.get(key).await?;

        if change(&mut alert)? {
            self.store
                .upsert(&alert)
                .await
                .map_err(|e| Self::store_failure(key, "upsert", e))?;
        }

        Ok(alert)
    }

    fn positive(key: &AlertKey, price: Decimal) -> AlertResult<()> {
        if price <= Decimal::ZERO {
            return Err(Self::invalid(key, format!("price must be above zero, got {price}")));
        }
        Ok(())
    }

    /// Records a new highest price. Not valid for shorts.
    pub async fn set_new_high(&self, key: &AlertKey, price: Decimal) -> AlertResult<Alert> {
        Self::positive(key, price)?;
        if key.class.tracks_lows() {
            return Err(Self::invalid(key, "shorts track lows, not highs"));
        }

        self.modify(key, |alert| {
            alert.extreme = price;
            Ok(true)
        })
        .await
    }

    /// Records a new lowest price. Shorts only.
    pub async fn set_new_low(&self, key: &AlertKey, price: Decimal) -> AlertResult<Alert> {
        Self::positive(key, price)?;
        if !key.class.tracks_lows() {
            return Err(Self::invalid(key, "only shorts track lows"));
        }

        self.modify(key, |alert| {
            alert.extreme = price;
            Ok(true)
        })
        .await
    }

    /// Moves the reference the trailing stop is measured from.
    pub async fn set_last_extreme(&self, key: &AlertKey, price: Decimal) -> AlertResult<Alert> {
        Self::positive(key, price)?;

        self.modify(key, |alert| {
            alert.last_extreme = price;
            Ok(true)
        })
        .await
    }

    pub async fn mark_poi_hit(&self, key: &AlertKey) -> AlertResult<Alert> {
        self.modify(key, |alert| {
            if alert.poi_hit {
                return Ok(false);
            }
            alert.poi_hit = true;
            Ok(true)
        })
        .await
    }

    /// Rebases the starting price, e.g. after averaging into a position.
    pub async fn set_new_average(&self, key: &AlertKey, price: Decimal) -> AlertResult<Alert> {
        Self::positive(key, price)?;

        self.modify(key, |alert| {
            alert.starting = price;
            Ok(true)
        })
        .await
    }

    pub fn is_live(&self, guild_id: &str, key: &AlertKey) -> bool {
        self.registry.contains(guild_id, key)
    }

    /// Every stored alert of a guild, stocks first, then shorts, options, crypto.
    pub async fn list(&self, guild_id: &str) -> AlertResult<Vec<Alert>> {
        let mut all = Vec::new();
        for class in InstrumentClass::ALL {
            let items = self
                .store
                .select_by_guild(guild_id, class)
                .await
                .map_err(|source| {
                    warn!(guild = guild_id, %class, error = %source, "unable to list alerts");
                    AlertError::GuildBackend {
                        class,
                        guild_id: guild_id.to_string(),
                        op: "select_by_guild",
                        source,
                    }
                })?;
            all.extend(items);
        }
        Ok(all)
    }

    /// Makes sure the guild has a registry bucket and returns the stored
    /// alerts that nothing is watching, for the watcher layer to recreate.
    pub async fn refresh(&self, guild_id: &str) -> AlertResult<Vec<Alert>> {
        self.registry.ensure_guild(guild_id);

        let orphans: Vec<Alert> = self
            .list(guild_id)
            .await?
            .into_iter()
            .filter(|alert| !self.registry.contains(guild_id, &alert.key()))
            .collect();

        if !orphans.is_empty() {
            info!(guild = guild_id, count = orphans.len(), "stored alerts awaiting a watcher");
        }
        Ok(orphans)
    }

    /// Removes every alert of a guild and returns how many rows went away.
    pub async fn remove_all(&self, guild_id: &str) -> AlertResult<usize> {
        warn!(guild = guild_id, "removing every alert of the guild");

        let mut removed = 0;
        for alert in self.list(guild_id).await? {
            match self.remove(guild_id, &alert.key()).await {
                Ok(()) => removed += 1,
                Err(err) if err.is_not_found() => {
                    debug!(guild = guild_id, alert = %alert.key(), "already gone");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(guild = guild_id, removed, "guild alerts removed");
        Ok(removed)
    }
}
