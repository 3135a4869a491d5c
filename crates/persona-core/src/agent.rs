//! Chat adapter: one turn in, one reply out.
//!
//! Holds the immutable system prompt, the tool registry, and the runtime.
//! Every failure path degrades to the fixed fallback reply; the caller never
//! sees an error.

use crate::chat::{normalize_history, ChatMessage};
use crate::runtime::{AgentRuntime, FALLBACK_REPLY};
use crate::tool::ToolRegistry;
use std::sync::Arc;

/// Per-process chat agent: system prompt + tools + runtime.
pub struct ChatAgent {
    instructions: String,
    tools: Arc<ToolRegistry>,
    runtime: Arc<dyn AgentRuntime>,
}

impl ChatAgent {
    pub fn new(
        instructions: impl Into<String>,
        tools: Arc<ToolRegistry>,
        runtime: Arc<dyn AgentRuntime>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            tools,
            runtime,
        }
    }

    /// The system prompt this agent was built with (constant for the process).
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Runs one conversational turn.
    ///
    /// History is normalized, the new user message appended, and the whole
    /// sequence handed to the runtime. The turn suspends until the runtime
    /// returns; there is no timeout here.
    pub async fn chat(&self, message: &str, history: &[serde_json::Value]) -> String {
        let mut messages = normalize_history(history);
        messages.push(ChatMessage::user(message));

        tracing::info!(
            target: "persona::chat",
            turns = messages.len(),
            "running turn"
        );

        match self
            .runtime
            .run(&self.instructions, &self.tools, &messages)
            .await
        {
            Ok(outcome) => outcome.reply_text(),
            Err(e) => {
                tracing::error!(target: "persona::chat", error = %e, "runtime error");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{RunOutcome, RuntimeError};
    use serde_json::json;
    use std::sync::Mutex;

    /// Captures the message sequence the adapter hands to the runtime.
    struct RecordingRuntime {
        outcome: Result<RunOutcome, RuntimeError>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl RecordingRuntime {
        fn returning(outcome: RunOutcome) -> Self {
            Self {
                outcome: Ok(outcome),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Err(RuntimeError::Transport("connection reset".into())),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl AgentRuntime for RecordingRuntime {
        async fn run(
            &self,
            _instructions: &str,
            _tools: &ToolRegistry,
            messages: &[ChatMessage],
        ) -> Result<RunOutcome, RuntimeError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            match &self.outcome {
                Ok(o) => Ok(o.clone()),
                Err(_) => Err(RuntimeError::Transport("connection reset".into())),
            }
        }
    }

    fn agent_with(runtime: Arc<RecordingRuntime>) -> ChatAgent {
        ChatAgent::new("instructions", Arc::new(ToolRegistry::new()), runtime)
    }

    #[tokio::test]
    async fn appends_user_turn_after_normalized_history() {
        let runtime = Arc::new(RecordingRuntime::returning(RunOutcome::Text("ok".into())));
        let agent = agent_with(Arc::clone(&runtime));
        let history = vec![json!(["USER", "earlier"]), json!({"bogus": true})];
        let reply = agent.chat("newest", &history).await;
        assert_eq!(reply, "ok");

        let seen = runtime.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChatMessage::user("earlier"));
        assert_eq!(seen[1], ChatMessage::user("newest"));
    }

    #[tokio::test]
    async fn runtime_error_degrades_to_fallback_reply() {
        let runtime = Arc::new(RecordingRuntime::failing());
        let agent = agent_with(runtime);
        assert_eq!(agent.chat("hi", &[]).await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn structured_outcome_goes_through_reply_extraction() {
        let runtime = Arc::new(RecordingRuntime::returning(RunOutcome::Structured(json!({
            "final_output": "typed reply"
        }))));
        let agent = agent_with(runtime);
        assert_eq!(agent.chat("hi", &[]).await, "typed reply");
    }
}
