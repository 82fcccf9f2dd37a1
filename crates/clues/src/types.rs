//! Clue system type definitions.

use serde::Serialize;

/// A stored unit of narrative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueRecord {
    /// Row id assigned by the store
    pub id: i64,

    /// Normalized clue text
    pub content: String,
}

impl ClueRecord {
    pub fn new(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// A candidate with its relevance score for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredClue {
    pub record: ClueRecord,
    pub score: u32,
}

/// Context handed to the Game Master for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetrievalResult {
    /// Selected clue contents joined by blank lines
    pub context_text: String,

    /// Selected clues, in ranked order
    pub sources: Vec<ClueRecord>,
}

impl RetrievalResult {
    /// Build a result from ranked clues, keeping their order.
    pub fn from_ranked(sources: Vec<ClueRecord>) -> Self {
        let context_text = sources
            .iter()
            .map(|clue| clue.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            context_text,
            sources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
