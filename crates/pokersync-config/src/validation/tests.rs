//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = PokerSyncConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_non_websocket_url() {
    let mut config = PokerSyncConfig::default();
    config.server.url = "http://localhost:3000".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.url"));
}

#[test]
fn accepts_secure_websocket_url() {
    let mut config = PokerSyncConfig::default();
    config.server.url = "wss://poker.example.com/ws".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_connect_timeout() {
    let mut config = PokerSyncConfig::default();
    config.server.connect_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.connect_timeout_secs"));
}

#[test]
fn catches_max_delay_below_base_delay() {
    let mut config = PokerSyncConfig::default();
    config.server.reconnect_delay_secs = 10;
    config.server.max_reconnect_delay_secs = 5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("is below server.reconnect_delay_secs"));
}

#[test]
fn catches_notice_ttl_out_of_range() {
    let mut config = PokerSyncConfig::default();
    config.session.notice_ttl_ms = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.notice_ttl_ms"));
}

#[test]
fn catches_blank_story_id() {
    let mut config = PokerSyncConfig::default();
    config.session.story_id = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.story_id"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = PokerSyncConfig::default();
    config.server.heartbeat_interval_secs = 0;
    config.session.event_channel_capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.heartbeat_interval_secs"));
    assert!(err.contains("session.event_channel_capacity"));
    assert!(err.contains("; "));
}
