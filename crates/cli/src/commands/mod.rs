//! Command handlers for the Mist Arena CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod clue;
pub mod play;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use clue::ClueCommand;
pub use play::PlayCommand;
pub use stats::StatsCommand;

use arena_clues::{initialize, ClueStore, InitOutcome};
use arena_core::{config::AppConfig, AppResult};
use arena_llm::{create_client, LlmClient};
use arena_prompt::{load_prompt, PromptDefinition, GAME_MASTER_PROMPT_ID};
use std::sync::Arc;
use std::time::Duration;

/// Open the configured clue store, creating or migrating it on first use.
pub(crate) fn open_store(config: &AppConfig) -> AppResult<ClueStore> {
    let (store, outcome) = initialize(&config.store_path, config.legacy_store_path.as_deref())?;

    match outcome {
        InitOutcome::Existing => tracing::debug!("Using clue store {:?}", config.store_path),
        InitOutcome::Created => tracing::info!("Created clue store {:?}", config.store_path),
        InitOutcome::Migrated { rows } => tracing::info!(
            "Migrated {} clues into {:?}",
            rows,
            config.store_path
        ),
    }

    Ok(store)
}

/// Chat client for the configured provider and host.
pub(crate) fn connect_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    create_client(
        &config.provider,
        Some(&config.host),
        Duration::from_secs(config.timeout_secs),
    )
}

/// The Game Master prompt, from the prompts directory when it overrides it.
pub(crate) fn game_master_prompt(config: &AppConfig) -> AppResult<PromptDefinition> {
    let prompt = load_prompt(config.prompts_dir.as_deref(), GAME_MASTER_PROMPT_ID)?;
    tracing::debug!("Loaded prompt definition: {}", prompt.id);
    Ok(prompt)
}
