//! `quizzard` - Discord quiz bot
//!
//! This binary wires the CLI to the bot: `run` connects to the gateway,
//! `db` manages the SQLite database, and `config` inspects configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use quizzard::cli::{Cli, Command, ConfigCommand, DbCommand};
use quizzard::{bot, init_logging, storage, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Run => Ok(bot::run(config).await?),
        Command::Db(db_cmd) => handle_db(&config, db_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_db(config: &Config, cmd: DbCommand) -> anyhow::Result<()> {
    let path = config.database_path();
    match cmd {
        DbCommand::Init => {
            let storage = Storage::open(&path)?;
            println!("Database ready at {}", storage.path().display());
        }
        DbCommand::Reset { yes } => {
            if !yes {
                println!(
                    "This will delete {} and its -wal/-shm files.",
                    path.display()
                );
                println!("Use --yes to confirm.");
                return Ok(());
            }
            let removed = storage::remove_database(&path)?;
            if removed == 0 {
                println!("No database found at {}", path.display());
            } else {
                println!("Removed {removed} file(s).");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                // Never print the token itself
                let mut value = serde_json::to_value(config)?;
                if let Some(token) = value.pointer_mut("/discord/token") {
                    if !token.is_null() {
                        *token = serde_json::Value::String("[redacted]".to_string());
                    }
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Discord]");
                println!(
                    "  Token:              {}",
                    if config.discord.token.is_some() {
                        "[set]"
                    } else {
                        "[not set]"
                    }
                );
                match config.discord.guild_id {
                    Some(guild_id) => println!("  Guild id:           {guild_id}"),
                    None => println!("  Guild id:           [not set]"),
                }
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Quiz]");
                println!(
                    "  Question timeout:   {}s",
                    config.quiz.question_timeout_secs
                );
                println!("  Questions per page: {}", config.quiz.questions_per_page);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
