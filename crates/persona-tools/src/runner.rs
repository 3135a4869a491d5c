//! Agent runtimes: a deterministic offline mock and a live OpenAI-compatible
//! chat-completions client with function calling.

use persona_core::{
    AgentRuntime, ChatMessage, Role, RunOutcome, RuntimeError, Tool, ToolCall, ToolDefinition,
    ToolRegistry,
};
use serde::Deserialize;
use serde_json::Value;

/// Offline runtime: deterministic generation, no credentials required.
///
/// When the newest user message contains an email-looking token, the mock
/// exercises the `record_user_details` tool before replying, so the tool
/// dispatch path stays covered in mock deployments.
pub struct MockRuntime;

impl MockRuntime {
    pub fn new() -> Self {
        Self
    }

    fn preview(text: &str) -> String {
        text.chars()
            .take(80)
            .chain(if text.chars().count() > 80 { "…" } else { "" }.chars())
            .collect()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AgentRuntime for MockRuntime {
    async fn run(
        &self,
        _instructions: &str,
        tools: &ToolRegistry,
        messages: &[ChatMessage],
    ) -> Result<RunOutcome, RuntimeError> {
        let latest = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if let Some(email) = latest.split_whitespace().find(|w| w.contains('@')) {
            if let Some(tool) = tools.get("record_user_details") {
                let args = serde_json::json!({
                    "email": email.trim_matches(|c: char| !c.is_alphanumeric() && c != '@' && c != '.'),
                    "notes": "captured by mock runtime"
                });
                if let Err(e) = tool.invoke(args).await {
                    tracing::warn!(target: "persona::runtime", error = %e, "mock tool invocation failed");
                }
                return Ok(RunOutcome::Text(
                    "[Mock] Thanks for sharing your contact details, I've recorded them and \
                     will be in touch shortly."
                        .to_string(),
                ));
            }
        }

        Ok(RunOutcome::Text(format!(
            "[Mock] Thanks for asking about \"{}\". In live mode I answer from the loaded \
             biography; right now I'm running without a model.",
            Self::preview(latest)
        )))
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

/// Live runtime: OpenAI-compatible chat completions with function calling.
///
/// One `run` may take several model/tool rounds; the round cap keeps a
/// confused model from looping forever.
pub struct OpenAiRuntime {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tool_rounds: u32,
}

impl OpenAiRuntime {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tool_rounds: u32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tool_rounds: max_tool_rounds.max(1),
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tool_defs: &[ToolDefinition],
    ) -> Result<ChoiceMessage, RuntimeError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if !tool_defs.is_empty() {
            body["tools"] = serde_json::to_value(tool_defs)
                .map_err(|e| RuntimeError::MalformedResponse(e.to_string()))?;
        }

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| RuntimeError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| RuntimeError::MalformedResponse("response carried no choices".into()))
    }

    /// Invokes one requested tool; unknown tools and tool errors become an
    /// `Error: …` result string the model can read and recover from.
    async fn run_tool_call(&self, tools: &ToolRegistry, call: &ToolCall) -> String {
        let Some(tool) = tools.get(&call.function.name) else {
            tracing::warn!(
                target: "persona::runtime",
                tool = %call.function.name,
                "model requested an unregistered tool"
            );
            return format!("Error: unknown tool {}", call.function.name);
        };
        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(v) => v,
            Err(e) => return format!("Error: malformed tool arguments: {e}"),
        };
        tracing::info!(target: "persona::runtime", tool = %call.function.name, "invoking tool");
        match tool.invoke(args).await {
            Ok(result) => result.to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[async_trait::async_trait]
impl AgentRuntime for OpenAiRuntime {
    async fn run(
        &self,
        instructions: &str,
        tools: &ToolRegistry,
        messages: &[ChatMessage],
    ) -> Result<RunOutcome, RuntimeError> {
        let tool_defs = tools.definitions();
        let mut transcript: Vec<ChatMessage> = Vec::with_capacity(messages.len() + 1);
        transcript.push(ChatMessage::system(instructions));
        transcript.extend_from_slice(messages);

        for round in 1..=self.max_tool_rounds {
            let choice = self.complete(&transcript, &tool_defs).await?;

            if choice.tool_calls.is_empty() {
                return Ok(match choice.content {
                    Some(content) if !content.is_empty() => RunOutcome::Text(content),
                    _ => RunOutcome::Failure("model returned an empty message".into()),
                });
            }

            tracing::debug!(
                target: "persona::runtime",
                round,
                calls = choice.tool_calls.len(),
                "model requested tool calls"
            );

            let mut assistant = ChatMessage::assistant(choice.content.unwrap_or_default());
            assistant.tool_calls = Some(choice.tool_calls.clone());
            transcript.push(assistant);

            for call in &choice.tool_calls {
                let result = self.run_tool_call(tools, call).await;
                transcript.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        Err(RuntimeError::ToolRoundLimit(self.max_tool_rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTool(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "record_user_details"
        }
        fn description(&self) -> &str {
            "counts invocations"
        }
        fn parameters_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn invoke(
            &self,
            _args: Value,
        ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({"recorded": "ok"}))
        }
    }

    #[tokio::test]
    async fn mock_reply_is_deterministic() {
        let runtime = MockRuntime::new();
        let tools = ToolRegistry::new();
        let messages = vec![ChatMessage::user("What are your skills?")];
        let a = runtime.run("sys", &tools, &messages).await.unwrap();
        let b = runtime.run("sys", &tools, &messages).await.unwrap();
        assert_eq!(a, b);
        match a {
            RunOutcome::Text(text) => assert!(text.contains("What are your skills?")),
            other => panic!("expected text outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_records_contact_details_through_the_registry() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CountingTool(Arc::clone(&count))));

        let runtime = MockRuntime::new();
        let messages = vec![ChatMessage::user("Reach me at alice@example.com please")];
        let outcome = runtime.run("sys", &tools, &messages).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        match outcome {
            RunOutcome::Text(text) => assert!(text.contains("recorded")),
            other => panic!("expected text outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_call_becomes_error_result_string() {
        let runtime = OpenAiRuntime::new("http://unused.invalid", "", "gpt-4o", 8);
        let tools = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".into(),
            call_type: "function".into(),
            function: persona_core::ToolCallFunction {
                name: "no_such_tool".into(),
                arguments: "{}".into(),
            },
        };
        let result = runtime.run_tool_call(&tools, &call).await;
        assert_eq!(result, "Error: unknown tool no_such_tool");
    }

    #[tokio::test]
    async fn malformed_tool_arguments_become_error_result_string() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CountingTool(Arc::clone(&count))));

        let runtime = OpenAiRuntime::new("http://unused.invalid", "", "gpt-4o", 8);
        let call = ToolCall {
            id: "call_1".into(),
            call_type: "function".into(),
            function: persona_core::ToolCallFunction {
                name: "record_user_details".into(),
                arguments: "{not json".into(),
            },
        };
        let result = runtime.run_tool_call(&tools, &call).await;
        assert!(result.starts_with("Error: malformed tool arguments"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn choice_message_parses_with_and_without_tool_calls() {
        let plain: ChoiceMessage =
            serde_json::from_str(r#"{"content": "hello", "role": "assistant"}"#).unwrap();
        assert_eq!(plain.content.as_deref(), Some("hello"));
        assert!(plain.tool_calls.is_empty());

        let with_calls: ChoiceMessage = serde_json::from_str(
            r#"{
                "content": null,
                "tool_calls": [{
                    "id": "call_9",
                    "type": "function",
                    "function": {"name": "record_unknown_question", "arguments": "{\"question\":\"?\"}"}
                }]
            }"#,
        )
        .unwrap();
        assert!(with_calls.content.is_none());
        assert_eq!(with_calls.tool_calls.len(), 1);
        assert_eq!(with_calls.tool_calls[0].function.name, "record_unknown_question");
    }
}
