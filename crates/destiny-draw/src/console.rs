//! Interactive multi-player console.
//!
//! Reads `<player> <command> [args...]` lines from an async reader and writes
//! each reply to an async writer. The service sits behind a shared
//! `Arc<Mutex<_>>`, so several consoles (or other front ends) may drive the
//! same table concurrently. Commands run on the blocking pool because they
//! touch `SQLite`, and each holds the lock for its whole run.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::service::GameService;

/// Default number of history entries shown by `history` without an argument.
pub const DEFAULT_HISTORY: usize = 10;

/// Usage text shown by `help` and after unknown commands.
pub const USAGE: &str = "\
Commands (prefix each with a player id):
  <player> start                 start a new combat
  <player> mulligan <pos>...     replace cards at 1-based positions
  <player> hand                  show your hand
  <player> resolutions           list hands you can resolve
  <player> resolve <n>           resolve hand number n
  <player> history [n]           show recently resolved hands
  <player> end                   end your combat
help                             show this text
quit                             leave the console";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start a new combat.
    Start {
        /// Player id.
        player: String,
    },
    /// Replace cards at the given positions (raw, unparsed).
    Mulligan {
        /// Player id.
        player: String,
        /// Whitespace-separated 1-based positions.
        positions: String,
    },
    /// Show the hand.
    Hand {
        /// Player id.
        player: String,
    },
    /// List available resolutions.
    Resolutions {
        /// Player id.
        player: String,
    },
    /// Resolve one listed hand.
    Resolve {
        /// Player id.
        player: String,
        /// 1-based number from the resolutions list.
        number: usize,
    },
    /// End the combat.
    End {
        /// Player id.
        player: String,
    },
    /// Show recent resolutions.
    History {
        /// Player id.
        player: String,
        /// How many to show.
        limit: usize,
    },
    /// Show usage.
    Help,
    /// Stop reading.
    Quit,
}

impl ConsoleCommand {
    /// Parse one input line. Returns `Ok(None)` for blank lines and comments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`], whose message is meant for the
    /// player, when the line is malformed.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let first = words.next().unwrap_or_default();
        match first {
            "help" | "?" => return Ok(Some(Self::Help)),
            "quit" | "exit" => return Ok(Some(Self::Quit)),
            _ => {}
        }

        let player = first.to_string();
        let Some(command) = words.next() else {
            return Err(Error::invalid_command(format!(
                "Missing command for player '{player}'."
            )));
        };
        let rest: Vec<&str> = words.collect();

        let parsed = match command {
            "start" | "start_new_combat" => Self::Start { player },
            "mulligan" => Self::Mulligan {
                player,
                positions: rest.join(" "),
            },
            "hand" | "view_hand" => Self::Hand { player },
            "resolutions" | "view_possible_resolutions" => Self::Resolutions { player },
            "resolve" | "resolve_hand" => {
                let number = rest
                    .first()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| Error::invalid_command("Usage: <player> resolve <n>"))?;
                Self::Resolve { player, number }
            }
            "history" => {
                let limit = match rest.first() {
                    Some(n) => n
                        .parse()
                        .map_err(|_| Error::invalid_command("Usage: <player> history [n]"))?,
                    None => DEFAULT_HISTORY,
                };
                Self::History { player, limit }
            }
            "end" | "end_combat" => Self::End { player },
            other => return Err(Error::invalid_command(format!("Unknown command '{other}'."))),
        };
        Ok(Some(parsed))
    }

    /// Run the command and produce its reply. `Quit` produces no reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying game command fails.
    pub fn execute(&self, service: &mut GameService) -> Result<Option<String>> {
        let reply = match self {
            Self::Start { player } => service.start_new_combat(player)?,
            Self::Mulligan { player, positions } => service.mulligan(player, positions)?,
            Self::Hand { player } => service.view_hand(player)?,
            Self::Resolutions { player } => service.view_possible_resolutions(player)?,
            Self::Resolve { player, number } => service.resolve_hand(player, *number)?,
            Self::End { player } => service.end_combat(player)?,
            Self::History { player, limit } => service.history_reply(player, *limit)?,
            Self::Help => USAGE.to_string(),
            Self::Quit => return Ok(None),
        };
        Ok(Some(reply))
    }
}

/// Drive `service` from `reader` until end of input or `quit`.
///
/// Game failures are reported to the writer and the loop continues; only I/O
/// failures on the reader or writer end the session with an error.
///
/// Returns the number of commands executed.
///
/// # Errors
///
/// Returns an error if reading input or writing a reply fails, or if a
/// command task panics.
pub async fn run<R, W>(service: Arc<Mutex<GameService>>, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut executed = 0;

    info!("Console session started");
    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                debug!("Rejected console line: {e}");
                write_reply(&mut writer, &format!("{e}\n{USAGE}")).await?;
                continue;
            }
        };
        debug!(?command, "Console command");

        let shared = Arc::clone(&service);
        let outcome =
            tokio::task::spawn_blocking(move || command.execute(&mut shared.blocking_lock()))
                .await?;

        match outcome {
            Ok(Some(reply)) => {
                executed += 1;
                write_reply(&mut writer, &reply).await?;
            }
            Ok(None) => break,
            Err(e) if e.is_user_error() => {
                debug!("Command rejected: {e}");
                write_reply(&mut writer, &format!("Error: {e}")).await?;
            }
            Err(e) => {
                error!("Command failed: {e}");
                write_reply(&mut writer, &format!("Error: {e}")).await?;
            }
        }
    }

    writer.flush().await?;
    info!(executed, "Console session ended");
    Ok(executed)
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &str) -> Result<()> {
    writer.write_all(reply.trim_end().as_bytes()).await?;
    writer.write_all(b"\n\n").await?;
    writer.flush().await?;
    Ok(())
}
