//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# PokerSync Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
url = "ws://localhost:3000/ws"
# auto_connect = true
# connect_timeout_secs = 15       # 1-120
# heartbeat_interval_secs = 25    # 1-300
# reconnect_delay_secs = 1        # 1-60, doubles after every failed attempt
# max_reconnect_delay_secs = 30   # 1-600

[session]
# notice_ttl_ms = 3000            # 100-60000
# story_id = "simple-voting"
# event_channel_capacity = 256

[logging]
# level = "INFO"                  # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
