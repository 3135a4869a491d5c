//! Conversation turns and history normalization.
//!
//! The UI host sends history in whatever shape its widget accumulated:
//! role/content mappings, or two-element `[role, content]` pairs. Everything
//! funnels into [`ChatMessage`] before the runtime sees it; entries that fit
//! neither shape are dropped, never bounced back to the user.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message author role (OpenAI chat-completions wire shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: ToolCallFunction,
}

/// Function name + raw JSON arguments inside a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: String,
}

/// One role-tagged turn in the conversation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Tool result addressed back to the call that requested it.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: None,
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_call_id: None,
            tool_calls: None,
        }
    }
}

/// Normalizes free-form history into a uniform turn list, preserving order.
///
/// - mapping form: kept iff `role` is a known role string and `content` is a
///   string; keys outside the `role`/`content`/`name` allow-list are
///   discarded;
/// - pair form: `[head, content]` where a head case-insensitively equal to
///   `"user"` maps to [`Role::User`] and anything else to [`Role::Assistant`];
/// - any other shape is silently dropped.
pub fn normalize_history(history: &[Value]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => normalize_mapping(map),
            Value::Array(pair) if pair.len() == 2 => normalize_pair(pair),
            other => {
                tracing::debug!(target: "persona::chat", entry = %other, "dropped malformed history entry");
                None
            }
        })
        .collect()
}

fn normalize_mapping(map: &serde_json::Map<String, Value>) -> Option<ChatMessage> {
    let role = match map.get("role").and_then(Value::as_str) {
        Some(r) if r.eq_ignore_ascii_case("user") => Role::User,
        Some(r) if r.eq_ignore_ascii_case("assistant") => Role::Assistant,
        Some(r) if r.eq_ignore_ascii_case("system") => Role::System,
        Some(r) if r.eq_ignore_ascii_case("tool") => Role::Tool,
        _ => {
            tracing::debug!(target: "persona::chat", "dropped mapping entry without a usable role");
            return None;
        }
    };
    let content = map.get("content").and_then(Value::as_str)?.to_string();
    let name = map.get("name").and_then(Value::as_str).map(str::to_string);
    Some(ChatMessage {
        role,
        content,
        name,
        tool_call_id: None,
        tool_calls: None,
    })
}

fn normalize_pair(pair: &[Value]) -> Option<ChatMessage> {
    let head = pair[0].as_str()?;
    let content = pair[1].as_str()?;
    let role = if head.eq_ignore_ascii_case("user") {
        Role::User
    } else {
        Role::Assistant
    };
    Some(ChatMessage {
        role,
        content: content.to_string(),
        name: None,
        tool_call_id: None,
        tool_calls: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_shapes_normalize_in_input_order() {
        let history = vec![
            json!({"role": "user", "content": "hi"}),
            json!(["assistant", "hello"]),
            json!({"role": "assistant", "content": "how can I help?"}),
        ];
        let turns = normalize_history(&history);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], ChatMessage::user("hi"));
        assert_eq!(turns[1], ChatMessage::assistant("hello"));
        assert_eq!(turns[2], ChatMessage::assistant("how can I help?"));
    }

    #[test]
    fn pair_head_user_is_case_insensitive() {
        for head in ["USER", "user", "User"] {
            let turns = normalize_history(&[json!([head, "x"])]);
            assert_eq!(turns[0].role, Role::User, "head {head:?}");
        }
        let turns = normalize_history(&[json!(["bot", "x"]), json!(["ASSISTANT", "y"])]);
        assert!(turns.iter().all(|t| t.role == Role::Assistant));
    }

    #[test]
    fn extra_mapping_keys_are_filtered_out() {
        let history = vec![json!({
            "role": "user",
            "content": "hi",
            "name": "alice",
            "metadata": {"widget": "v2"},
            "avatar": "alice.png"
        })];
        let turns = normalize_history(&history);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].name.as_deref(), Some("alice"));
        let wire = serde_json::to_value(&turns[0]).unwrap();
        assert!(wire.get("metadata").is_none());
        assert!(wire.get("avatar").is_none());
    }

    #[test]
    fn unusable_shapes_are_silently_dropped() {
        let history = vec![
            json!(42),
            json!(["user"]),
            json!(["user", "a", "b"]),
            json!({"content": "no role"}),
            json!({"role": "user"}),
            json!({"role": "narrator", "content": "x"}),
            json!(null),
            json!({"role": "user", "content": "kept"}),
        ];
        let turns = normalize_history(&history);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "kept");
    }

    #[test]
    fn roles_serialize_lowercase() {
        let wire = serde_json::to_value(ChatMessage::tool_result("call_1", "ok")).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
    }
}
