//! Mist Arena CLI
//!
//! Main entry point for the `arena` command-line game.
//! Ask the Game Master about the mystery; answers are grounded in clues
//! retrieved from the local store.

mod commands;
mod input;
mod session;

#[cfg(test)]
mod testing;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ClueCommand, PlayCommand, StatsCommand};
use arena_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Mystery at MIST University - an interactive fiction game
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Mystery at MIST University: ask the Game Master about the case", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./arena.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the clue store
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Generation endpoint host (e.g. http://localhost:11434)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Number of clues retrieved per question
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play the interactive game (default)
    Play(PlayCommand),

    /// Ask the Game Master a single question
    Ask(AskCommand),

    /// Manage and inspect clues
    Clue(ClueCommand),

    /// Show clue store statistics
    Stats(StatsCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from the config file and environment
    let config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.db,
        cli.host,
        cli.model,
        cli.top_k,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Mist Arena starting");
    tracing::debug!("Store: {:?}", config.store_path);
    tracing::debug!("Host: {}", config.host);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command = cli
        .command
        .unwrap_or(Commands::Play(PlayCommand::default()));

    let command_name = match &command {
        Commands::Play(_) => "play",
        Commands::Ask(_) => "ask",
        Commands::Clue(_) => "clue",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match command {
        Commands::Play(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Clue(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
