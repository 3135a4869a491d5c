//! persona-tools: concrete capabilities for the persona gateway.
//!
//! The two notification tools forward to Pushover; the runtimes implement
//! `persona_core::AgentRuntime` in mock (offline, deterministic) and live
//! (OpenAI-compatible chat completions with function calling) flavors.

mod pushover;
mod record;
mod runner;

pub use pushover::PushoverClient;
pub use record::{RecordUnknownQuestion, RecordUserDetails};
pub use runner::{MockRuntime, OpenAiRuntime};
