//! Stats command handler.
//!
//! Shows where the clue store lives and how many clues it holds.

use super::open_store;
use arena_core::{config::AppConfig, AppResult};
use clap::Args;
use std::path::Path;

/// Show clue store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = open_store(config)?;
        let count = store.count()?;

        if self.json {
            println!("{}", stats_json(&config.store_path, count)?);
        } else {
            println!("Store: {}", config.store_path.display());
            println!("Clues: {}", count);
        }

        Ok(())
    }
}

fn stats_json(store_path: &Path, count: u64) -> AppResult<String> {
    let value = serde_json::json!({
        "store": store_path.display().to_string(),
        "clues": count,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
