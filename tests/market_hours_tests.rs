use chrono::{DateTime, TimeZone, Utc};
use pricesentry::services::market_hours::{is_trading_hours, MARKET_TZ};

fn eastern(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    MARKET_TZ
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

// 2024-06-15 is a Saturday, 2024-06-12 a Wednesday.

#[test]
fn saturday_noon_is_closed() {
    assert!(!is_trading_hours(eastern(2024, 6, 15, 12, 0)));
}

#[test]
fn sunday_is_closed() {
    assert!(!is_trading_hours(eastern(2024, 6, 16, 11, 0)));
}

#[test]
fn wednesday_ten_is_open() {
    assert!(is_trading_hours(eastern(2024, 6, 12, 10, 0)));
}

#[test]
fn wednesday_before_open_is_closed() {
    assert!(!is_trading_hours(eastern(2024, 6, 12, 9, 29)));
    assert!(!is_trading_hours(eastern(2024, 6, 12, 8, 45)));
}

#[test]
fn opening_bell_is_open() {
    assert!(is_trading_hours(eastern(2024, 6, 12, 9, 30)));
    assert!(is_trading_hours(eastern(2024, 6, 12, 15, 59)));
}

#[test]
fn closing_bell_is_closed() {
    assert!(!is_trading_hours(eastern(2024, 6, 12, 16, 0)));
}

#[test]
fn follows_daylight_saving() {
    // 14:30 UTC is 09:30 EST in January but 10:30 EDT in July
    let winter_open = Utc.with_ymd_and_hms(2024, 1, 10, 14, 30, 0).unwrap();
    let summer = Utc.with_ymd_and_hms(2024, 7, 10, 13, 30, 0).unwrap();
    let winter_early = Utc.with_ymd_and_hms(2024, 1, 10, 13, 30, 0).unwrap();

    assert!(is_trading_hours(winter_open));
    assert!(is_trading_hours(summer));
    assert!(!is_trading_hours(winter_early));
}

#[test]
fn monday_after_spring_forward_opens_on_local_time() {
    // DST began 2024-03-10; 09:30 EDT on the 11th is 13:30 UTC
    assert!(is_trading_hours(Utc.with_ymd_and_hms(2024, 3, 11, 13, 30, 0).unwrap()));
    assert!(!is_trading_hours(Utc.with_ymd_and_hms(2024, 3, 11, 13, 29, 0).unwrap()));
}
