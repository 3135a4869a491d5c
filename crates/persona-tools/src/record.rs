//! The two notification tools the model can call.
//!
//! Both format a human-readable line and forward it to Pushover. A failed
//! notification is logged at WARN and the tool still acknowledges: losing a
//! push must never break the visitor's conversation.

use crate::pushover::PushoverClient;
use persona_core::Tool;
use serde_json::{json, Value};

const NAME_NOT_PROVIDED: &str = "Name not provided";
const NOTES_NOT_PROVIDED: &str = "not provided";

fn acknowledgment() -> Value {
    json!({"recorded": "ok"})
}

/// Records a visitor's email and optional details.
pub struct RecordUserDetails {
    pushover: PushoverClient,
}

impl RecordUserDetails {
    pub fn new(pushover: PushoverClient) -> Self {
        Self { pushover }
    }

    fn format_message(email: &str, name: &str, notes: &str) -> String {
        format!("Recording {name} with email {email} and notes {notes}")
    }
}

#[async_trait::async_trait]
impl Tool for RecordUserDetails {
    fn name(&self) -> &str {
        "record_user_details"
    }

    fn description(&self) -> &str {
        "Records that a visitor is interested in being in touch, with their email address, \
         optional name, and optional notes about the conversation."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The visitor's email address"
                },
                "name": {
                    "type": "string",
                    "description": "The visitor's name, if they provided it"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional context from the conversation worth recording"
                }
            },
            "required": ["email"]
        })
    }

    async fn invoke(
        &self,
        args: Value,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let email = args
            .get("email")
            .and_then(Value::as_str)
            .ok_or("record_user_details requires an email argument")?;
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(NAME_NOT_PROVIDED);
        let notes = args
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or(NOTES_NOT_PROVIDED);

        let message = Self::format_message(email, name, notes);
        if let Err(e) = self.pushover.notify(&message).await {
            tracing::warn!(target: "persona::tools", error = %e, "user-details notification not delivered");
        }
        Ok(acknowledgment())
    }
}

/// Records a question the model could not (or must not) answer.
pub struct RecordUnknownQuestion {
    pushover: PushoverClient,
}

impl RecordUnknownQuestion {
    pub fn new(pushover: PushoverClient) -> Self {
        Self { pushover }
    }
}

#[async_trait::async_trait]
impl Tool for RecordUnknownQuestion {
    fn name(&self) -> &str {
        "record_unknown_question"
    }

    fn description(&self) -> &str {
        "Records any question that is out of scope or that could not be answered."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that could not be answered"
                }
            },
            "required": ["question"]
        })
    }

    async fn invoke(
        &self,
        args: Value,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let question = args
            .get("question")
            .and_then(Value::as_str)
            .ok_or("record_unknown_question requires a question argument")?;

        let message = format!("Recording unknown question: {question}");
        if let Err(e) = self.pushover.notify(&message).await {
            tracing::warn!(target: "persona::tools", error = %e, "unknown-question notification not delivered");
        }
        Ok(acknowledgment())
    }
}
