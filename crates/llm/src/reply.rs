//! Parser for chat endpoint replies.
//!
//! Two reply shapes are accepted, depending on the endpoint version:
//!
//! - native: `{"message": {"content": "..."}}`
//! - OpenAI-compatible: `{"choices": [{"message": {"content": "..."}}]}`
//!
//! The native shape is checked first. Anything else is `Unrecognized` and
//! degrades to an empty answer instead of an error.

use crate::client::{ChatResponse, LlmUsage};
use arena_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct NativeShape {
    message: MessageShape,
}

#[derive(Debug, Deserialize)]
struct CompatShape {
    choices: Vec<ChoiceShape>,
}

#[derive(Debug, Deserialize)]
struct ChoiceShape {
    #[serde(default)]
    message: Option<MessageShape>,
}

#[derive(Debug, Deserialize)]
struct MessageShape {
    #[serde(default)]
    content: Option<String>,
}

/// A chat reply classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// `{message: {content}}`
    Native { content: Option<String> },
    /// `{choices: [{message: {content}}]}`, first choice only
    Compat { content: Option<String> },
    /// Any other JSON value
    Unrecognized,
}

impl ChatReply {
    /// Classify a decoded JSON reply.
    pub fn from_value(value: &Value) -> Self {
        if let Ok(native) = NativeShape::deserialize(value) {
            return Self::Native {
                content: native.message.content,
            };
        }

        if let Ok(compat) = CompatShape::deserialize(value) {
            let content = compat
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message)
                .and_then(|message| message.content);
            return Self::Compat { content };
        }

        Self::Unrecognized
    }

    pub fn into_content(self) -> String {
        match self {
            Self::Native { content } | Self::Compat { content } => content.unwrap_or_default(),
            Self::Unrecognized => String::new(),
        }
    }
}

/// Decode a raw reply body into a [`ChatResponse`].
///
/// A body that is not JSON at all is an error.
pub fn parse_response(body: &str) -> AppResult<ChatResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::Llm(format!("Reply is not valid JSON: {}", e)))?;
    Ok(response_from_value(&value))
}

/// Build a [`ChatResponse`] from a decoded reply, including model and usage
/// when the endpoint reports them.
pub fn response_from_value(value: &Value) -> ChatResponse {
    let reply = ChatReply::from_value(value);
    if reply == ChatReply::Unrecognized {
        tracing::warn!("Unrecognized chat reply shape; treating as empty answer");
    }

    ChatResponse {
        content: reply.into_content(),
        model: value
            .get("model")
            .and_then(Value::as_str)
            .map(str::to_string),
        usage: usage_from_value(value),
    }
}

fn usage_from_value(value: &Value) -> LlmUsage {
    let count = |v: Option<&Value>| {
        v.and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0)
    };

    // Native replies report eval counts at the top level
    if value.get("prompt_eval_count").is_some() || value.get("eval_count").is_some() {
        return LlmUsage::new(
            count(value.get("prompt_eval_count")),
            count(value.get("eval_count")),
        );
    }

    match value.get("usage") {
        Some(usage) => LlmUsage::new(
            count(usage.get("prompt_tokens")),
            count(usage.get("completion_tokens")),
        ),
        None => LlmUsage::default(),
    }
}
