//! `destiny_draw` - combat card draws for tabletop role-playing sessions.
//!
//! Every player owns a 30-card elemental deck. During a combat they hold a
//! hand of five, may mulligan cards, and resolve pairs (*Matched Edge*) or
//! triples (*Triple Threat*) of one rank into combat effects. State is kept
//! in `SQLite` so a combat survives between commands.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cards;
pub mod cli;
pub mod config;
pub mod console;
pub mod deck;
pub mod error;
pub mod logging;
pub mod player;
pub mod resolution;
pub mod service;
pub mod storage;
pub mod table;

pub use cards::{Card, Element, Suit};
pub use config::Config;
pub use deck::Deck;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use player::PlayerState;
pub use resolution::{find_resolutions, Resolution, ResolutionKind};
pub use service::GameService;
pub use storage::{Storage, StorageStats};
pub use table::Table;
