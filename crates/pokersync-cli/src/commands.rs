//! Interactive commands read from stdin, one per line.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Vote(String),
    Change,
    Start,
    Reveal,
    Round,
    Leave,
    Status,
    Export(Option<PathBuf>),
    Dismiss,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  vote <card>    submit a card (e.g. vote 5, vote ?)
  change         pick a different card
  start          start voting (moderator)
  reveal         reveal all votes (moderator)
  round          start a new round after a reveal (moderator)
  leave          leave the room
  status         show the room
  export [path]  write revealed results as JSON
  dismiss        clear the last error
  help           show this help
  quit           leave and exit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<UserCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for '{head}'"));
    }

    let command = match (head.to_ascii_lowercase().as_str(), arg) {
        ("vote", Some(card)) => UserCommand::Vote(card.to_string()),
        ("vote", None) => return Err("usage: vote <card>".into()),
        ("export", path) => UserCommand::Export(path.map(PathBuf::from)),
        (cmd, Some(_)) if is_bare(cmd) => return Err(format!("'{cmd}' takes no arguments")),
        ("change", None) => UserCommand::Change,
        ("start", None) => UserCommand::Start,
        ("reveal", None) => UserCommand::Reveal,
        ("round", None) => UserCommand::Round,
        ("leave", None) => UserCommand::Leave,
        ("status", None) => UserCommand::Status,
        ("dismiss", None) => UserCommand::Dismiss,
        ("help", None) | ("?", None) => UserCommand::Help,
        ("quit", None) | ("exit", None) => UserCommand::Quit,
        (other, _) => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn is_bare(cmd: &str) -> bool {
    matches!(
        cmd,
        "change" | "start" | "reveal" | "round" | "leave" | "status" | "dismiss" | "help" | "?"
            | "quit" | "exit"
    )
}
