//! Ask command handler.
//!
//! Answers one question without entering the interactive loop.

use super::{connect_client, game_master_prompt, open_store};
use crate::session::{GameSession, Turn};
use arena_clues::Retriever;
use arena_core::{config::AppConfig, AppError, AppResult};
use clap::Args;

/// Ask the Game Master a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question_text()?;

        let store = open_store(config)?;
        let client = connect_client(config)?;
        let prompt = game_master_prompt(config)?;
        let session = GameSession::new(
            Retriever::new(&store, config.retrieval),
            client.as_ref(),
            prompt,
            config.model.clone(),
        );

        let turn = session.take_turn(&question).await?;

        if self.json {
            println!("{}", turn_json(&turn, &config.model)?);
        } else {
            print!("{}", turn.render());
        }

        Ok(())
    }

    /// Words of the question joined back together, trimmed.
    fn question_text(&self) -> AppResult<String> {
        let question = self.question.join(" ").trim().to_string();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }
        Ok(question)
    }
}

/// JSON form of a turn: `{answer, model, sources: [{id, content}]}`.
fn turn_json(turn: &Turn, requested_model: &str) -> AppResult<String> {
    let value = serde_json::json!({
        "answer": turn.answer,
        "model": turn.model.as_deref().unwrap_or(requested_model),
        "sources": turn.sources,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
