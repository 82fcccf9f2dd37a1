//! Clue command handler.
//!
//! Adds, lists and searches clues in the store without calling the model.

use super::open_store;
use crate::session::preview;
use arena_clues::{ClueRecord, ClueStore, Retriever};
use arena_core::{config::AppConfig, AppError, AppResult};
use clap::{Args, Subcommand};

/// Manage and inspect clues
#[derive(Args, Debug)]
pub struct ClueCommand {
    #[command(subcommand)]
    pub action: ClueAction,
}

#[derive(Subcommand, Debug)]
pub enum ClueAction {
    /// Add a clue to the store
    Add {
        /// Clue text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List stored clues in id order
    List {
        /// Maximum number of clues to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Show which clues a question would retrieve
    Search {
        /// The question to retrieve clues for
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

impl ClueCommand {
    /// Execute the clue command.
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clue command");
        tracing::debug!("Clue options: {:?}", self);

        let store = open_store(config)?;

        match &self.action {
            ClueAction::Add { text } => {
                let id = add_clue(&store, &text.join(" "))?;
                println!("Added clue #{}", id);
            }
            ClueAction::List { limit } => {
                let clues = store.list(*limit)?;
                if clues.is_empty() {
                    println!("No clues stored.");
                }
                for clue in &clues {
                    println!("{}", format_clue(clue));
                }
            }
            ClueAction::Search { question } => {
                let retriever = Retriever::new(&store, config.retrieval);
                let result = retriever.retrieve(&question.join(" "), retriever.default_top_k())?;
                if result.is_empty() {
                    println!("No clues retrieved.");
                }
                for clue in &result.sources {
                    println!("{}", format_clue(clue));
                }
            }
        }

        Ok(())
    }
}

fn add_clue(store: &ClueStore, text: &str) -> AppResult<i64> {
    let id = store.insert(text)?;
    tracing::info!("Stored clue #{}", id);
    Ok(id)
}

fn format_clue(clue: &ClueRecord) -> String {
    format!("- #{}: {}", clue.id, preview(&clue.content))
}
