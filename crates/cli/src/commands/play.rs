//! Play command handler.
//!
//! Runs the interactive question loop until the player quits.

use super::{connect_client, game_master_prompt, open_store};
use crate::input::{LineReader, ReadLine, ReadOutcome};
use crate::session::{GameSession, PlayerInput, BANNER, FAREWELL, INSTRUCTIONS};
use arena_clues::Retriever;
use arena_core::{config::AppConfig, AppError, AppResult};
use clap::Args;
use std::io::Write;

/// Play the interactive game
#[derive(Args, Debug, Default)]
pub struct PlayCommand {}

impl PlayCommand {
    /// Execute the play command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing play command");

        let store = open_store(config)?;
        let client = connect_client(config)?;
        let prompt = game_master_prompt(config)?;
        let session = GameSession::new(
            Retriever::new(&store, config.retrieval),
            client.as_ref(),
            prompt,
            config.model.clone(),
        );

        let mut reader = LineReader::new()?;
        run_game(
            &session,
            &mut reader,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await
    }
}

/// The question loop.
///
/// A failed model call is reported on `err` and the loop moves on to the
/// next prompt. Any other error ends the game.
pub(crate) async fn run_game<R, O, E>(
    session: &GameSession<'_>,
    reader: &mut R,
    out: &mut O,
    err: &mut E,
) -> AppResult<()>
where
    R: ReadLine,
    O: Write,
    E: Write,
{
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "{}", INSTRUCTIONS)?;

    loop {
        out.flush()?;

        let line = match reader.read_line()? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted | ReadOutcome::Eof => {
                writeln!(out, "\n{}", FAREWELL)?;
                break;
            }
        };

        let question = match PlayerInput::classify(&line) {
            PlayerInput::Empty => continue,
            PlayerInput::Quit => {
                writeln!(out, "{}", FAREWELL)?;
                break;
            }
            PlayerInput::Question(question) => question,
        };

        match session.take_turn(&question).await {
            Ok(turn) => write!(out, "{}", turn.render())?,
            Err(AppError::Llm(msg)) => {
                tracing::error!("Game Master request failed: {}", msg);
                writeln!(err, "\nGM> (unavailable) {}", msg)?;
            }
            Err(e) => return Err(e),
        }
    }

    out.flush()?;
    Ok(())
}
