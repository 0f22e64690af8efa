use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// US equity session timezone. DST is handled by the tz database.
pub const MARKET_TZ: Tz = chrono_tz::America::New_York;

/// Regular session check, 09:30 to 16:00 Eastern on weekdays.
///
/// Market holidays are not special-cased.
pub fn is_trading_hours(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&MARKET_TZ);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let hour = local.hour();
    let minute = local.minute();
    if hour < 9 || (hour == 9 && minute < 30) || hour >= 16 {
        return false;
    }

    true
}

pub fn is_trading_hours_now() -> bool {
    is_trading_hours(Utc::now())
}
