//! Command-line interface for destiny_draw.
//!
//! This module provides the CLI structure for the `destiny_draw` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, HistoryCommand, MulliganCommand, PlayCommand, ResolveCommand, StatusCommand,
};

/// destiny_draw - Combat card draws for your table
///
/// Keeps each player's deck, hand and discard pile between invocations and
/// shows which pairs and triples can be resolved into combat effects.
#[derive(Debug, Parser)]
#[command(name = "destiny_draw")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Player id (defaults to the configured player)
    #[arg(short, long, global = true, value_name = "ID")]
    pub player: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new combat and draw a full hand
    #[command(alias = "start-new-combat")]
    Start,

    /// Replace cards in your hand
    Mulligan(MulliganCommand),

    /// Show your hand
    #[command(alias = "view-hand")]
    Hand,

    /// List hands you can resolve
    #[command(alias = "view-possible-resolutions")]
    Resolutions,

    /// Resolve one of the listed hands
    #[command(alias = "resolve-hand")]
    Resolve(ResolveCommand),

    /// End your combat and put your cards away
    #[command(alias = "end-combat")]
    End,

    /// Show recently resolved hands
    History(HistoryCommand),

    /// Run an interactive multi-player console on stdin/stdout
    Play(PlayCommand),

    /// Show stored players and database statistics
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The player to act for: the `--player` flag, else the configured default.
    #[must_use]
    pub fn player_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.player.as_deref().unwrap_or(default)
    }
}
