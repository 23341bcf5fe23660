//! CLI command definitions.
//!
//! This module defines the arguments of the CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Mulligan command arguments.
#[derive(Debug, Args)]
pub struct MulliganCommand {
    /// Card positions to replace (1-based)
    #[arg(required = true, value_name = "POSITION")]
    pub positions: Vec<String>,
}

impl MulliganCommand {
    /// Positions joined the way a player would type them.
    #[must_use]
    pub fn joined(&self) -> String {
        self.positions.join(" ")
    }
}

/// Resolve command arguments.
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Hand number from the resolutions list
    pub number: usize,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Maximum number of entries
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Play command arguments.
#[derive(Debug, Args)]
pub struct PlayCommand {
    /// Keep the table in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
