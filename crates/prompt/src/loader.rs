//! Prompt loader for YAML prompt definitions.

use crate::types::PromptDefinition;
use arena_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in Game Master prompt.
pub const GAME_MASTER_PROMPT_ID: &str = "game_master";

const GAME_MASTER_YAML: &str = include_str!("../prompts/game_master.yml");

/// Parse a built-in prompt by ID.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let source = match prompt_id {
        GAME_MASTER_PROMPT_ID => GAME_MASTER_YAML,
        other => {
            return Err(AppError::Prompt(format!(
                "No built-in prompt named '{}'",
                other
            )))
        }
    };

    let definition: PromptDefinition = serde_yaml::from_str(source).map_err(|e| {
        AppError::Prompt(format!("Failed to parse built-in prompt '{}': {}", prompt_id, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `prompts_dir` takes precedence over the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use arena_prompt::{load_prompt, GAME_MASTER_PROMPT_ID};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(None, GAME_MASTER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    let Some(prompt_file) = prompts_dir
        .map(|dir| dir.join(format!("{}.yml", prompt_id)))
        .filter(|path| path.exists())
    else {
        tracing::debug!("Using built-in prompt: {}", prompt_id);
        return builtin_prompt(prompt_id);
    };

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
