//! Line input for the interactive game, backed by rustyline.

use arena_core::{AppError, AppResult};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Prompt shown before each player question, a blank line after the last turn.
pub const PLAYER_PROMPT: &str = "\nYou> ";

/// Outcome of one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D or closed stdin
    Eof,
}

/// Source of player lines for the game loop.
pub trait ReadLine {
    fn read_line(&mut self) -> AppResult<ReadOutcome>;
}

/// Readline wrapper with in-memory history for the session.
pub struct LineReader {
    editor: DefaultEditor,
}

impl LineReader {
    pub fn new() -> AppResult<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| AppError::Other(format!("Failed to initialize line editor: {}", e)))?;
        Ok(Self { editor })
    }
}

impl ReadLine for LineReader {
    /// Read one line after [`PLAYER_PROMPT`].
    fn read_line(&mut self) -> AppResult<ReadOutcome> {
        match self.editor.readline(PLAYER_PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    if let Err(e) = self.editor.add_history_entry(trimmed) {
                        tracing::debug!("Failed to record history entry: {}", e);
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(ReadlineError::Io(err)) => Err(AppError::Io(err)),
            Err(err) => Err(AppError::Other(format!("Readline error: {}", err))),
        }
    }
}
