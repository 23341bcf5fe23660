//! `destiny_draw` - CLI for combat card draws
//!
//! One-shot commands load the player's combat from the database, apply the
//! command and save it back. `play` runs a console for a whole table.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex;

use destiny_draw::cli::{Cli, Command, ConfigCommand, HistoryCommand, PlayCommand};
use destiny_draw::{console, init_logging, Config, GameService, Storage};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands must work even when the default file is broken.
    if let Command::Config(cmd) = &cli.command {
        return handle_config(cli.config.clone(), cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let player = cli.player_or(&config.player).to_string();

    match &cli.command {
        Command::Start => print_reply(&open_service(&config)?.start_new_combat(&player)?),
        Command::Mulligan(cmd) => {
            print_reply(&open_service(&config)?.mulligan(&player, &cmd.joined())?);
        }
        Command::Hand => print_reply(&open_service(&config)?.view_hand(&player)?),
        Command::Resolutions => {
            print_reply(&open_service(&config)?.view_possible_resolutions(&player)?);
        }
        Command::Resolve(cmd) => {
            print_reply(&open_service(&config)?.resolve_hand(&player, cmd.number)?);
        }
        Command::End => print_reply(&open_service(&config)?.end_combat(&player)?),
        Command::History(cmd) => handle_history(&config, &player, cmd)?,
        Command::Play(cmd) => handle_play(&config, cmd)?,
        Command::Status(cmd) => handle_status(&config, cmd.json)?,
        Command::Config(_) => {}
    }
    Ok(())
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn open_service(config: &Config) -> Result<GameService> {
    Ok(GameService::with_storage(config, open_storage(config)?))
}

fn print_reply(reply: &str) {
    println!("{}", reply.trim_end());
}

fn handle_history(config: &Config, player: &str, cmd: &HistoryCommand) -> Result<()> {
    let service = open_service(config)?;
    if cmd.json {
        let records = service.history(player, cmd.limit)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_reply(&service.history_reply(player, cmd.limit)?);
    }
    Ok(())
}

fn handle_play(config: &Config, cmd: &PlayCommand) -> Result<()> {
    let service = if cmd.ephemeral {
        GameService::in_memory(config)
    } else {
        open_service(config)?
    };
    let service = Arc::new(Mutex::new(service));

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        console::run(service, stdin, tokio::io::stdout()).await
    })?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;
    let players = storage.list_players()?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "stats": stats,
            "players": players,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("destiny_draw status");
    println!("-------------------");
    println!("Database:      {}", config.database_path().display());
    println!("Size:          {} bytes", stats.db_size_bytes);
    println!("Players:       {}", stats.players);
    println!("Resolutions:   {}", stats.resolutions);
    if let Some(last) = stats.last_activity {
        println!("Last activity: {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !players.is_empty() {
        println!();
        println!("{:<20} {:>5} {:>5} {:>8}  STARTED", "PLAYER", "HAND", "DECK", "DISCARD");
        for p in &players {
            println!(
                "{:<20} {:>5} {:>5} {:>8}  {}",
                p.player_id,
                p.hand,
                p.deck,
                p.discard,
                p.started_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("loading configuration")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("Default player:       {}", config.player);
                println!();
                println!("[Game]");
                println!("  Hand size:          {}", config.game.hand_size);
                println!("  Ranks per suit:     {}", config.game.ranks_per_suit);
                println!("  Jokers:             {}", config.game.jokers);
                println!("  Joker value:        {}", config.game.joker_value);
                match config.game.seed {
                    Some(seed) => println!("  Seed:               {seed}"),
                    None => println!("  Seed:               (random)"),
                }
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  History limit:      {}", config.storage.history_limit);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("configuration {} is invalid", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
