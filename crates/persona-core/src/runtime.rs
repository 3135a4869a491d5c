//! Agent runtime contract and the typed run outcome.
//!
//! A runtime orchestrates model calls and tool invocations for one turn and
//! reports back as a [`RunOutcome`]: direct text, a structured value in a
//! provider-specific shape, or a described failure. [`RunOutcome::reply_text`]
//! is the single place that turns an outcome into user-visible text.

use crate::chat::ChatMessage;
use crate::tool::ToolRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

/// Reply returned when no usable text can be extracted from a run.
pub const FALLBACK_REPLY: &str = "Sorry, could not get a response.";

/// Structured-outcome fields probed for a reply, in priority order.
const REPLY_FIELDS: [&str; 3] = ["final_output", "output", "content"];

/// Last-resort scrape for runtimes that only expose a debug rendering of
/// their result. Stops at a quote so a JSON rendering does not leak syntax.
static FINAL_OUTPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Final output \(str\):\s*([^"\n]+)"#).unwrap());

/// Errors a runtime can report for one turn.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model endpoint returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("tool round limit of {0} reached without a final reply")]
    ToolRoundLimit(u32),
}

/// Result of one runtime run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The runtime produced final reply text directly.
    Text(String),
    /// The runtime produced a structured value whose shape is its own.
    Structured(serde_json::Value),
    /// The runtime finished without anything usable; the reason is for logs.
    Failure(String),
}

impl RunOutcome {
    /// Extracts user-visible reply text.
    ///
    /// Structured values are probed for `final_output`, `output`, `content`
    /// in that order; failing that, the stringified value is scraped for a
    /// `Final output (str):` marker. Every dead end becomes [`FALLBACK_REPLY`].
    pub fn reply_text(&self) -> String {
        match self {
            RunOutcome::Text(s) => s.clone(),
            RunOutcome::Structured(value) => {
                for field in REPLY_FIELDS {
                    if let Some(s) = value.get(field).and_then(|v| v.as_str()) {
                        return s.to_string();
                    }
                }
                let rendered = value.to_string();
                if let Some(caps) = FINAL_OUTPUT_RE.captures(&rendered) {
                    return caps[1].trim().to_string();
                }
                tracing::warn!(
                    target: "persona::runtime",
                    "no reply text in structured outcome; using fallback"
                );
                FALLBACK_REPLY.to_string()
            }
            RunOutcome::Failure(reason) => {
                tracing::warn!(target: "persona::runtime", reason = %reason, "run failed; using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// External system that runs one conversational turn: it decides whether to
/// call the model, call tools, or both, and for how many rounds.
#[async_trait::async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(
        &self,
        instructions: &str,
        tools: &ToolRegistry,
        messages: &[ChatMessage],
    ) -> Result<RunOutcome, RuntimeError>;
}
