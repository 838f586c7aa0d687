//! pokersync: join a planning-poker room from the terminal.
//!
//! Connects to the session server, joins (or creates) a room, and mirrors
//! room state to stdout while reading commands from stdin.

mod cli;
mod commands;
mod driver;
mod render;

use pokersync_config::PokerSyncConfig;
use pokersync_sync::SessionContext;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "pokersync=info";

/// `--log-level debug` means `pokersync=debug`; anything with `=` is a full directive.
fn log_directive(arg: Option<&str>, config: &PokerSyncConfig) -> String {
    match arg {
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("pokersync={level}"),
        None => format!("pokersync={}", config.logging.level.as_directive()),
    }
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let (mut config, config_error) = match pokersync_config::load_config_from(args.config.as_deref())
    {
        Ok(config) => (config, None),
        Err(e) => (PokerSyncConfig::default(), Some(e)),
    };

    init_logging(&log_directive(args.log_level.as_deref(), &config));
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
    }

    if let Some(server) = args.server {
        config.server.url = server;
    }
    tracing::info!(server = %config.server.url, "pokersync starting");

    let (context, transport_rx) = SessionContext::start(config);
    if let Err(e) = driver::run(context, transport_rx, args.command).await {
        tracing::error!(error = %e, "Session ended with an error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_pokersync() {
        let config = PokerSyncConfig::default();
        assert_eq!(log_directive(Some("debug"), &config), "pokersync=debug");
        assert_eq!(
            log_directive(Some("pokersync_sync=trace"), &config),
            "pokersync_sync=trace"
        );
    }

    #[test]
    fn falls_back_to_config_level() {
        let config = PokerSyncConfig::default();
        assert_eq!(log_directive(None, &config), "pokersync=info");
    }
}
