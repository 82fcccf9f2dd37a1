//! Prompt system for Mist Arena.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions (one built in, overridable per directory)
//! - Handlebars template rendering
//! - Retrieved-clue context injection

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, GAME_MASTER_PROMPT_ID};
pub use types::{BuiltPrompt, PromptDefinition};
