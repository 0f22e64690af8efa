mod common;

use pricesentry::config::{parse_servers, ChannelClassifier};
use pricesentry::error::ConfigError;
use pricesentry::models::ChannelClass;

#[test]
fn servers_file_is_parsed() {
    let servers = common::servers();

    assert_eq!(servers.len(), 1);
    let g1 = &servers[0];
    assert_eq!(g1.id, "g1");
    assert_eq!(g1.alert_role, "perm-1");
    assert_eq!(g1.allowed_roles, vec!["admin".to_string()]);
    assert!(g1.whitelisted_ids.is_empty());
    assert_eq!(g1.channels.eod, "c-eod");
    assert_eq!(g1.channels.premium, "");

    let alerter = &g1.channels.alerters[0];
    assert_eq!(alerter.channel_id, "c-alerts");
    assert_eq!(alerter.user_id, "u1");
    assert_eq!(alerter.role_id, "r1");
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let servers = parse_servers(r#"{ "servers": [{ "id": "bare" }] }"#).unwrap();

    assert_eq!(servers[0].id, "bare");
    assert!(servers[0].channels.alerters.is_empty());
    assert_eq!(servers[0].alert_role, "");
}

#[test]
fn malformed_file_is_a_json_error() {
    let err = parse_servers(r#"{ "servers": "#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn classifier_maps_configured_channels() {
    let classifier = ChannelClassifier::new(&common::servers());

    assert_eq!(classifier.classify("g1", "c-swing"), Some(ChannelClass::Swing));
    assert_eq!(classifier.classify("g1", "c-day"), Some(ChannelClass::Day));
    assert_eq!(classifier.classify("g1", "c-watch"), Some(ChannelClass::Watchlist));
}

#[test]
fn classifier_ignores_unknown_channels_and_guilds() {
    let classifier = ChannelClassifier::new(&common::servers());

    assert_eq!(classifier.classify("g1", "c-eod"), None);
    assert_eq!(classifier.classify("g2", "c-swing"), None);
    // unset channels are empty strings and must not match an empty id
    assert_eq!(classifier.classify("g1", ""), None);
}
