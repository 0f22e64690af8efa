use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OptionContract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Stock,
    Short,
    Option,
    Crypto,
}

impl InstrumentClass {
    pub const ALL: [InstrumentClass; 4] = [
        InstrumentClass::Stock,
        InstrumentClass::Short,
        InstrumentClass::Option,
        InstrumentClass::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentClass::Stock => "stock",
            InstrumentClass::Short => "short",
            InstrumentClass::Option => "option",
            InstrumentClass::Crypto => "crypto",
        }
    }

    /// Shorts track the lowest price, everything else the highest.
    pub fn tracks_lows(&self) -> bool {
        matches!(self, InstrumentClass::Short)
    }
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelClass {
    Day,
    Swing,
    Watchlist,
}

/// Primary key of a stored alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub class: InstrumentClass,
    pub alert_id: String,
}

impl AlertKey {
    pub fn new(class: InstrumentClass, alert_id: impl Into<String>) -> Self {
        Self {
            class,
            alert_id: alert_id.into(),
        }
    }

    /// Deterministic id for alerts created without a caller-supplied one.
    pub fn derived(class: InstrumentClass, guild_id: &str, symbol: &str) -> Self {
        Self::new(class, format!("{symbol}_{guild_id}"))
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.alert_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub alert_id: String,

    pub guild_id: String,
    // ticker, coin, or the encoded options code
    pub symbol: String,
    pub class: InstrumentClass,
    pub channel_class: ChannelClass,

    pub starting: Decimal,
    // highest price for long-biased alerts, lowest for shorts
    pub extreme: Decimal,
    pub last_extreme: Decimal,

    pub poi: Option<Decimal>,
    pub poi_hit: bool,
    pub stop: Option<Decimal>,
    pub trailing_stop: Option<Decimal>,
    pub scale_target: Option<Decimal>,
    pub exit_target: Option<Decimal>,
    pub expiry: Option<i64>,

    pub option: Option<OptionContract>,
    pub underlying_starting: Option<Decimal>,

    pub caller: String,
    pub created_at: i64,
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey::new(self.class, self.alert_id.clone())
    }
}

/// Anything with an entry price that gains can be measured against.
pub trait Priced {
    fn starting(&self) -> Decimal;
}

impl Priced for Alert {
    fn starting(&self) -> Decimal {
        self.starting
    }
}

/// Percent move from the starting price to `current`.
///
/// Returns `None` when the starting price is zero or the result overflows.
pub fn percent_gain<P: Priced + ?Sized>(priced: &P, current: Decimal) -> Option<Decimal> {
    let starting = priced.starting();
    if starting.is_zero() {
        return None;
    }

    current
        .checked_sub(starting)?
        .checked_div(starting)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Price at which the trailing stop fires, measured from the last extreme.
///
/// `None` without a trailing stop, or if the level is not representable.
pub fn trailing_stop_level(alert: &Alert) -> Option<Decimal> {
    let offset = alert.trailing_stop?;
    if alert.class.tracks_lows() {
        alert.last_extreme.checked_add(offset)
    } else {
        alert.last_extreme.checked_sub(offset)
    }
}
