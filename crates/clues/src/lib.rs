//! Clue store and keyword retrieval.
//!
//! Clues live in a single SQLite table `clues (id, content)`. A question is
//! tokenized into lowercase terms, candidates are pulled with an OR-ed
//! substring filter, scored by term frequency with a whole-word bonus, and
//! the top-K are handed on as context for the Game Master.

pub mod migrate;
pub mod retrieve;
pub mod score;
pub mod store;
pub mod text;
pub mod types;


// Re-export commonly used types
pub use migrate::{initialize, migrate_legacy, InitOutcome};
pub use retrieve::Retriever;
pub use score::{score, QueryTerms};
pub use store::ClueStore;
pub use text::{normalize_text, tokenize};
pub use types::{ClueRecord, RetrievalResult, ScoredClue};
