//! LLM integration crate for Mist Arena.
//!
//! This crate provides a provider-agnostic abstraction for asking a chat
//! model to answer as the Game Master.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (`POST /api/chat`)
//!
//! # Example
//! ```no_run
//! use arena_llm::{ChatMessage, ChatRequest, LlmClient, OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::with_base_url("http://localhost:11434", Duration::from_secs(120))?;
//! let request = ChatRequest::new("qwen3:4b", vec![ChatMessage::user("Who took the key?")]);
//! let response = client.chat(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod reply;

// Re-export main types
pub use client::{ChatMessage, ChatRequest, ChatResponse, ChatRole, LlmClient, LlmUsage};
pub use factory::{create_client, ProviderType};
pub use providers::OllamaClient;
pub use reply::ChatReply;
