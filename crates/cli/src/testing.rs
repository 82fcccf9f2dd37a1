//! Test doubles shared by the session and command tests.

use crate::input::{ReadLine, ReadOutcome};
use arena_clues::ClueStore;
use arena_core::{AppError, AppResult};
use arena_llm::{ChatRequest, ChatResponse, LlmClient};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Client that replays canned answers and records every request.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<AppResult<ChatResponse>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<AppResult<ChatResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(content: &str) -> Self {
        Self::new(vec![Ok(answer(content))])
    }
}

pub fn answer(content: &str) -> ChatResponse {
    ChatResponse {
        content: content.to_string(),
        model: Some("scripted".to_string()),
        ..ChatResponse::default()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted reply left".to_string())))
    }
}

/// Line source that replays fixed reads, then reports EOF.
pub struct ScriptedReader {
    reads: VecDeque<ReadOutcome>,
}

impl ScriptedReader {
    pub fn lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| ReadOutcome::Line(l.to_string())).collect())
    }

    pub fn new(reads: Vec<ReadOutcome>) -> Self {
        Self {
            reads: reads.into(),
        }
    }
}

impl ReadLine for ScriptedReader {
    fn read_line(&mut self) -> AppResult<ReadOutcome> {
        Ok(self.reads.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

pub fn mystery_store() -> ClueStore {
    let store = ClueStore::open_in_memory().unwrap();
    store.insert("The professor hid a key in the library.").unwrap();
    store.insert("No one saw the thief.").unwrap();
    store
}
