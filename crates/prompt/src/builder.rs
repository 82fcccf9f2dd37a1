//! Prompt builder for rendering templates with retrieved context.

use crate::types::{BuiltPrompt, PromptDefinition};
use arena_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build the chat prompt for one player question.
///
/// `context_text` is the retrieved clue text; when it is blank the
/// definition's `emptyContext` placeholder is rendered instead. Both inputs
/// are trimmed.
///
/// # Example
/// ```no_run
/// use arena_prompt::{build_prompt, load_prompt, GAME_MASTER_PROMPT_ID};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, GAME_MASTER_PROMPT_ID)?;
/// let built = build_prompt(&def, "Where is the key?", "The key is in the library.")?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    question: &str,
    context_text: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let context = match context_text.trim() {
        "" => definition.empty_context.clone(),
        trimmed => trimmed.to_string(),
    };

    let mut variables = HashMap::new();
    variables.insert("context", context);
    variables.insert("question", question.trim().to_string());

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system: definition.system.clone(),
        user,
        source_prompt_id: definition.id.clone(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<&str, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Clue text is plain prose, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
