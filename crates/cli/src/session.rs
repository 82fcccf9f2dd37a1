//! One game session: retrieve clues, ask the Game Master, format the turn.

use arena_clues::{ClueRecord, Retriever};
use arena_core::AppResult;
use arena_llm::{ChatRequest, LlmClient};
use arena_prompt::{build_prompt, PromptDefinition};

/// Characters of clue text shown per cited source.
pub const PREVIEW_CHARS: usize = 120;

/// Shown when the Game Master returns an empty answer.
pub const NO_ANSWER: &str = "(No answer)";

pub const BANNER: &str = "Prompt Arena - Mystery at MIST University";
pub const INSTRUCTIONS: &str = "Type 'exit' or 'quit' to end. Ask anything about the case.";
pub const FAREWELL: &str = "Goodbye!";

/// What the player typed, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Quit,
    Empty,
    Question(String),
}

impl PlayerInput {
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            Self::Quit
        } else {
            Self::Question(trimmed.to_string())
        }
    }
}

/// Result of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub answer: String,
    pub model: Option<String>,
    pub sources: Vec<ClueRecord>,
}

impl Turn {
    /// Console rendering: the answer, then the cited clues.
    pub fn render(&self) -> String {
        let mut out = String::from("\nGM>\n");
        if self.answer.is_empty() {
            out.push_str(NO_ANSWER);
        } else {
            out.push_str(&self.answer);
        }
        out.push('\n');

        if !self.sources.is_empty() {
            out.push_str("\n[Retrieved clues]\n");
            for source in &self.sources {
                out.push_str(&format!("- #{}: {}\n", source.id, preview(&source.content)));
            }
        }

        out
    }
}

/// Trimmed clue text cut to [`PREVIEW_CHARS`] characters, with `…` when cut.
pub fn preview(content: &str) -> String {
    let content = content.trim();
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Everything one question needs, borrowed for the length of a session.
pub struct GameSession<'a> {
    retriever: Retriever<'a>,
    client: &'a dyn LlmClient,
    prompt: PromptDefinition,
    model: String,
}

impl<'a> GameSession<'a> {
    pub fn new(
        retriever: Retriever<'a>,
        client: &'a dyn LlmClient,
        prompt: PromptDefinition,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            client,
            prompt,
            model: model.into(),
        }
    }

    /// Answer one question with the configured number of clues.
    pub async fn take_turn(&self, question: &str) -> AppResult<Turn> {
        self.take_turn_with(question, self.retriever.default_top_k())
            .await
    }

    /// Answer one question with `top_k` clues.
    pub async fn take_turn_with(&self, question: &str, top_k: usize) -> AppResult<Turn> {
        let retrieved = self.retriever.retrieve(question, top_k)?;
        tracing::debug!("Retrieved {} clues", retrieved.sources.len());

        let built = build_prompt(&self.prompt, question, &retrieved.context_text)?;
        let request = ChatRequest::with_system(&self.model, built.system.as_deref(), &built.user);

        let response = self.client.chat(&request).await?;

        Ok(Turn {
            answer: response.content,
            model: response.model,
            sources: retrieved.sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mystery_store, ScriptedClient};
    use arena_clues::ClueStore;
    use arena_core::config::RetrievalConfig;
    use arena_core::AppError;
    use arena_llm::ChatRole;
    use arena_prompt::{builtin_prompt, GAME_MASTER_PROMPT_ID};

    fn session<'a>(store: &'a ClueStore, client: &'a ScriptedClient) -> GameSession<'a> {
        GameSession::new(
            Retriever::new(store, RetrievalConfig::default()),
            client,
            builtin_prompt(GAME_MASTER_PROMPT_ID).unwrap(),
            "qwen3:4b",
        )
    }

    #[test]
    fn test_classify_input() {
        assert_eq!(PlayerInput::classify("  "), PlayerInput::Empty);
        assert_eq!(PlayerInput::classify("EXIT"), PlayerInput::Quit);
        assert_eq!(PlayerInput::classify(" Quit "), PlayerInput::Quit);
        assert_eq!(
            PlayerInput::classify(" Who is the thief? "),
            PlayerInput::Question("Who is the thief?".to_string())
        );
        assert_eq!(
            PlayerInput::classify("exit now"),
            PlayerInput::Question("exit now".to_string())
        );
    }

    #[test]
    fn test_preview_truncates_long_clues() {
        let long = "a".repeat(130);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), 121);
        assert!(shown.ends_with('…'));

        let exact = "b".repeat(120);
        assert_eq!(preview(&exact), exact);
        assert_eq!(preview("  short clue \n"), "short clue");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let accented = "é".repeat(121);
        let shown = preview(&accented);
        assert_eq!(shown, format!("{}…", "é".repeat(120)));
    }

    #[test]
    fn test_render_turn() {
        let turn = Turn {
            answer: "Check the library.".to_string(),
            model: None,
            sources: vec![ClueRecord::new(1, "The professor hid a key in the library.")],
        };
        assert_eq!(
            turn.render(),
            "\nGM>\nCheck the library.\n\n[Retrieved clues]\n- #1: The professor hid a key in the library.\n"
        );
    }

    #[test]
    fn test_render_empty_answer_without_sources() {
        let turn = Turn {
            answer: String::new(),
            model: None,
            sources: Vec::new(),
        };
        assert_eq!(turn.render(), "\nGM>\n(No answer)\n");
    }

    #[tokio::test]
    async fn test_turn_sends_context_and_question() {
        let store = mystery_store();
        let client = ScriptedClient::answering("Look in the library.");

        let turn = session(&store, &client)
            .take_turn("Where is the key?")
            .await
            .unwrap();

        assert_eq!(turn.answer, "Look in the library.");
        assert_eq!(turn.sources[0].id, 1);

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "qwen3:4b");
        assert!(!request.stream);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert!(request.messages[1].content.starts_with(
            "Context (retrieved clues):\nThe professor hid a key in the library.\n\nNo one saw the thief."
        ));
        assert!(request.messages[1]
            .content
            .contains("Player question: Where is the key?"));
    }

    #[tokio::test]
    async fn test_turn_without_terms_sends_placeholder_context() {
        let store = mystery_store();
        let client = ScriptedClient::answering("Ask me something.");

        let turn = session(&store, &client).take_turn("???").await.unwrap();
        assert!(turn.sources.is_empty());

        let requests = client.requests.lock().unwrap();
        assert!(requests[0].messages[1]
            .content
            .starts_with("Context (retrieved clues):\n<no context found>"));
    }

    #[tokio::test]
    async fn test_turn_respects_top_k() {
        let store = mystery_store();
        let client = ScriptedClient::answering("ok");

        let turn = session(&store, &client)
            .take_turn_with("Where is the key?", 1)
            .await
            .unwrap();
        assert_eq!(turn.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_llm_failure_fails_the_turn() {
        let store = mystery_store();
        let client = ScriptedClient::new(vec![Err(AppError::Llm("connection refused".to_string()))]);

        let result = session(&store, &client).take_turn("Where is the key?").await;
        assert!(matches!(result, Err(AppError::Llm(_))));

        // The store is untouched and the next turn can still run
        assert_eq!(store.count().unwrap(), 2);
    }
}
