//! Full configuration validation.
//!
//! Validates numeric ranges and the server URL, collecting every error
//! into a single `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::PokerSyncConfig;
use pokersync_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PokerSyncConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_session(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &PokerSyncConfig) {
    let server = &config.server;
    if !(server.url.starts_with("ws://") || server.url.starts_with("wss://")) {
        errors.push(format!(
            "server.url = {:?} must start with ws:// or wss://",
            server.url
        ));
    }
    validate_range(
        errors,
        "server.connect_timeout_secs",
        server.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "server.heartbeat_interval_secs",
        server.heartbeat_interval_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "server.reconnect_delay_secs",
        server.reconnect_delay_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "server.max_reconnect_delay_secs",
        server.max_reconnect_delay_secs,
        1,
        600,
    );
    if server.max_reconnect_delay_secs < server.reconnect_delay_secs {
        errors.push(format!(
            "server.max_reconnect_delay_secs = {} is below server.reconnect_delay_secs = {}",
            server.max_reconnect_delay_secs, server.reconnect_delay_secs
        ));
    }
}

fn validate_session(errors: &mut Vec<String>, config: &PokerSyncConfig) {
    validate_range(
        errors,
        "session.notice_ttl_ms",
        config.session.notice_ttl_ms,
        100,
        60_000,
    );
    validate_range(
        errors,
        "session.event_channel_capacity",
        config.session.event_channel_capacity as u64,
        1,
        65_536,
    );
    if config.session.story_id.trim().is_empty() {
        errors.push("session.story_id must not be empty".into());
    }
}
