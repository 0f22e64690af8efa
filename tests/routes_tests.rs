mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{test_state, CountingChannels, CountingStore};
use http_body_util::BodyExt;
use pricesentry::routes;
use pricesentry::services::alert_lifecycle::NewAlert;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

async fn response_json(res: axum::response::Response) -> Value {
    serde_json::from_str(&response_body_string(res).await).expect("json body")
}

#[tokio::test]
async fn health_is_ok() {
    let app = routes::app(test_state(CountingStore::new(), CountingChannels::new()));

    let res = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_body_string(res).await, "ok");
}

#[tokio::test]
async fn health_db_reports_store_failure() {
    let store = CountingStore::new();
    store.fail_reads(true);
    let app = routes::app(test_state(store, CountingChannels::new()));

    let res = app.oneshot(get("/health/db")).await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response_body_string(res).await.contains("store error"));
}

#[tokio::test]
async fn market_reports_open_flag() {
    let app = routes::app(test_state(CountingStore::new(), CountingChannels::new()));

    let res = app.oneshot(get("/market")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_json(res).await;
    assert!(body["open"].is_boolean());
    assert!(body["checked_at"].is_i64());
}

#[tokio::test]
async fn guild_alerts_lists_with_live_flag() {
    let state = test_state(CountingStore::new(), CountingChannels::new());
    let live = state
        .alerts
        .create(NewAlert::stock("g1", "AAPL", "u1", dec!(100)).with_trailing_stop(dec!(2)))
        .await
        .unwrap();
    let orphan = state
        .alerts
        .create(NewAlert::crypto("g1", "BTC", "u1", dec!(60000)))
        .await
        .unwrap();
    state.alerts.registry().clear("g1", &orphan.key);
    let app = routes::app(state);

    let res = app.oneshot(get("/guilds/g1/alerts")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_json(res).await;
    assert_eq!(body["guild_id"], "g1");
    assert_eq!(body["count"], 2);

    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts[0]["alert_id"], live.key.alert_id.as_str());
    assert_eq!(alerts[0]["class"], "stock");
    assert_eq!(alerts[0]["live"], true);
    assert!(!alerts[0]["trailing_stop_level"].is_null());
    assert_eq!(alerts[1]["class"], "crypto");
    assert_eq!(alerts[1]["live"], false);
}

#[tokio::test]
async fn guild_alerts_store_failure_is_500() {
    let store = CountingStore::new();
    store.fail_reads(true);
    let app = routes::app(test_state(store, CountingChannels::new()));

    let res = app.oneshot(get("/guilds/g1/alerts")).await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unconfigured_guild_config_is_404() {
    let app = routes::app(test_state(CountingStore::new(), CountingChannels::new()));

    let res = app.oneshot(get("/guilds/ghost/config")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn guild_config_shows_permission_and_alerters() {
    let state = test_state(CountingStore::new(), CountingChannels::new());
    state.channels.initialise_server("g1", "perm-1", "c-eod").await.unwrap();
    state.channels.create_alerter("g1", "c-alerts", "u1", "r1").await.unwrap();
    let app = routes::app(state);

    let res = app.oneshot(get("/guilds/g1/config")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_json(res).await;
    assert_eq!(body["permissions_id"], "perm-1");
    assert_eq!(body["eod_channel_id"], "c-eod");
    assert_eq!(body["alerters"], 1);
}

#[tokio::test]
async fn channel_class_lookup() {
    let state = test_state(CountingStore::new(), CountingChannels::new());

    let res = routes::app(state.clone())
        .oneshot(get("/guilds/g1/channels/c-day/class"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["class"], "day");

    let res = routes::app(state)
        .oneshot(get("/guilds/g1/channels/c-eod/class"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_path_falls_back_to_404() {
    let app = routes::app(test_state(CountingStore::new(), CountingChannels::new()));

    let res = app.oneshot(get("/nope")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
