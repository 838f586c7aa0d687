//! The single driver loop: transport events, session events, store
//! changes and stdin lines, one at a time.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use pokersync_common::{is_valid_room_code, normalize_room_code, PokerSyncError};
use pokersync_sync::{
    export_file_name, ConnectionStatus, LocalRoomProvider, ResultsExport, SessionContext,
    TransportEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use crate::cli::Command;
use crate::commands::{parse_command, UserCommand, HELP};
use crate::render::{describe_event, results_lines, status_lines};

/// How long to wait for queued frames to go out on exit.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Output of one stdin command.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Outcome {
    fn say(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }

    fn silent() -> Self {
        Self::default()
    }
}

/// Run the initial `join` / `create` action.
pub async fn start_session(context: &SessionContext, command: &Command) {
    if context.store().status.get() == ConnectionStatus::Disconnected {
        context.connection().connect();
    }
    let sync = context.synchronizer();
    match command {
        Command::Join { code, name, role } => {
            let code = normalize_room_code(code);
            if !is_valid_room_code(&code) {
                tracing::warn!(code = %code, "Room code does not look like a 6-character code");
            }
            println!("Joining room {code} as {name}...");
            sync.join_room(&code, name, *role);
        }
        Command::Create { name } => {
            println!("Creating a room for {name}...");
            sync.create_room(&LocalRoomProvider, name).await;
        }
    }
}

/// Drive the session until `quit`, end of input, or the transport task exits.
pub async fn run(
    context: SessionContext,
    mut transport_rx: mpsc::Receiver<TransportEvent>,
    command: Command,
) -> pokersync_common::Result<()> {
    let mut session_rx = context.subscribe();
    let store = context.store();
    let mut status_rx = store.status.subscribe();
    let mut error_rx = store.connection_error.subscribe();
    let mut room_rx = store.current_room.subscribe();
    let mut votes_rx = store.current_votes.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    start_session(&context, &command).await;

    loop {
        tokio::select! {
            event = transport_rx.recv() => match event {
                Some(event) => context.handle_event(event),
                None => {
                    tracing::warn!("Transport task exited");
                    break;
                }
            },
            event = session_rx.recv() => match event {
                Ok(event) => println!("{}", describe_event(&event)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Ok(()) = status_rx.changed() => {
                println!("[{}]", status_rx.borrow().label());
            },
            Ok(()) = error_rx.changed() => {
                if let Some(error) = error_rx.borrow().clone() {
                    println!("[error] {error} (type 'dismiss' to clear)");
                }
            },
            Ok(()) = room_rx.changed() => {
                let joined = room_rx.borrow().clone();
                if let Some(room) = joined {
                    println!(
                        "[room] {} [{}]: {}, {} participant(s)",
                        room.name,
                        room.code,
                        store.effective_phase().label(),
                        room.participants.len()
                    );
                }
            },
            Ok(()) = votes_rx.changed() => {
                println!("[votes] {}/{} voted", store.voted_count(), store.player_count());
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    let outcome = execute_line(&context, &line);
                    for out in &outcome.lines {
                        println!("{out}");
                    }
                    if outcome.quit {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    if store.current_room.get().is_some() {
        context.synchronizer().leave_room();
    }
    if store.status.get() != ConnectionStatus::Disconnected {
        context.connection().disconnect();
        wait_for_close(&context, &mut transport_rx, CLOSE_GRACE).await;
    }
    tracing::info!("Session closed");
    Ok(())
}

/// Feed transport events until `Disconnected`, the task exits, or `grace`
/// runs out.
pub async fn wait_for_close(
    context: &SessionContext,
    transport_rx: &mut mpsc::Receiver<TransportEvent>,
    grace: Duration,
) -> bool {
    let closed = async {
        while let Some(event) = transport_rx.recv().await {
            let done = event == TransportEvent::Disconnected;
            context.handle_event(event);
            if done {
                return;
            }
        }
    };
    match tokio::time::timeout(grace, closed).await {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!(grace = ?grace, "Transport did not close in time");
            false
        }
    }
}

pub fn execute_line(context: &SessionContext, line: &str) -> Outcome {
    match parse_command(line) {
        Ok(Some(command)) => execute(context, command),
        Ok(None) => Outcome::silent(),
        Err(message) => Outcome::say(message),
    }
}

pub fn execute(context: &SessionContext, command: UserCommand) -> Outcome {
    let store = context.store();
    let sync = context.synchronizer();

    match command {
        UserCommand::Vote(card) => {
            let Some(room) = store.current_room.get() else {
                return Outcome::say("join a room first");
            };
            if !store.can_vote() {
                return Outcome::say("only players can vote");
            }
            if !room.deck.contains(&card) {
                return Outcome::say(format!(
                    "'{card}' is not in the deck: {}",
                    room.deck.cards.join(" ")
                ));
            }
            if store.has_submitted_vote.get() {
                return Outcome::say("you already voted; use 'change' first");
            }
            sync.submit_vote(&card, &sync.settings().story_id);
            Outcome::say(format!("voted {card}"))
        }
        UserCommand::Change => {
            sync.change_vote();
            Outcome::say("pick a new card with 'vote <card>'")
        }
        UserCommand::Start | UserCommand::Round => {
            if store.current_room.get().is_none() {
                return Outcome::say("join a room first");
            }
            if !store.is_current_user_moderator() {
                return Outcome::say("only the moderator can start voting");
            }
            if !store.can_start_voting() {
                return Outcome::say("need at least 2 players to start voting");
            }
            if command == UserCommand::Round {
                sync.start_new_round();
            } else {
                sync.start_voting();
            }
            Outcome::silent()
        }
        UserCommand::Reveal => {
            if !store.is_current_user_moderator() {
                return Outcome::say("only the moderator can reveal votes");
            }
            sync.reveal_votes();
            Outcome::silent()
        }
        UserCommand::Leave => {
            sync.leave_room();
            Outcome::say("left the room")
        }
        UserCommand::Status => Outcome {
            lines: status_lines(store),
            quit: false,
        },
        UserCommand::Export(path) => match export(context, path) {
            Ok(Some(path)) => Outcome::say(format!("results written to {}", path.display())),
            Ok(None) => Outcome::say("nothing to export yet"),
            Err(e) => Outcome::say(format!("export failed: {e}")),
        },
        UserCommand::Dismiss => {
            sync.dismiss_error();
            Outcome::silent()
        }
        UserCommand::Help => Outcome::say(HELP),
        UserCommand::Quit => {
            let mut outcome = Outcome {
                lines: results_lines(store),
                quit: true,
            };
            outcome.lines.push("bye".to_string());
            outcome
        }
    }
}

fn export(
    context: &SessionContext,
    path: Option<PathBuf>,
) -> Result<Option<PathBuf>, PokerSyncError> {
    let now = Utc::now();
    let Some(export) = ResultsExport::build(context.store(), now) else {
        return Ok(None);
    };
    let path = path.unwrap_or_else(|| {
        PathBuf::from(export_file_name(
            &export.session_info.room_code,
            now.date_naive(),
        ))
    });
    export.write_to(&path)?;
    Ok(Some(path))
}
