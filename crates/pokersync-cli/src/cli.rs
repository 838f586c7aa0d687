use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pokersync_sync::Role;

/// PokerSync: planning poker from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pokersync", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Session server URL override (ws:// or wss://).
    #[arg(long)]
    pub server: Option<String>,

    /// Log level override (debug, info, warn, error) or a full filter directive.
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Join an existing room by its 6-character code.
    Join {
        code: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// player or observer.
        #[arg(long, default_value = "player", value_parser = parse_join_role)]
        role: Role,
    },
    /// Create a new room and join it as moderator.
    Create {
        /// Display name.
        #[arg(long)]
        name: String,
    },
}

fn parse_join_role(s: &str) -> Result<Role, String> {
    match s.parse::<Role>()? {
        Role::Moderator => Err("moderators create rooms; join as player or observer".into()),
        role => Ok(role),
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_defaults_to_player() {
        let args = Args::try_parse_from(["pokersync", "join", "abc123", "--name", "Ann"]).unwrap();
        assert_eq!(
            args.command,
            Command::Join {
                code: "abc123".into(),
                name: "Ann".into(),
                role: Role::Player,
            }
        );
        assert!(args.config.is_none());
    }

    #[test]
    fn join_as_observer() {
        let args = Args::try_parse_from([
            "pokersync", "join", "ABC123", "--name", "Cy", "--role", "observer",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Join {
                role: Role::Observer,
                ..
            }
        ));
    }

    #[test]
    fn join_as_moderator_is_rejected() {
        let result = Args::try_parse_from([
            "pokersync", "join", "ABC123", "--name", "Cy", "--role", "moderator",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn create_with_overrides() {
        let args = Args::try_parse_from([
            "pokersync",
            "--server",
            "wss://poker.example.com/ws",
            "--log-level",
            "debug",
            "create",
            "--name",
            "Sarah",
        ])
        .unwrap();
        assert_eq!(args.server.as_deref(), Some("wss://poker.example.com/ws"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(
            args.command,
            Command::Create {
                name: "Sarah".into()
            }
        );
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["pokersync"]).is_err());
    }
}
