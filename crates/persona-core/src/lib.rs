//! persona-core: chatbot core library (config, profile, prompt, chat adapter, tool registry).
//!
//! The gateway and the tools crate build on these types so every surface shares
//! one config struct, one message shape, and one tool contract.

mod agent;
mod chat;
mod config;
mod profile;
mod prompt;
mod runtime;
mod tool;

pub use agent::ChatAgent;
pub use chat::{normalize_history, ChatMessage, Role, ToolCall, ToolCallFunction};
pub use config::PersonaConfig;
pub use profile::Profile;
pub use prompt::build_system_prompt;
pub use runtime::{AgentRuntime, RunOutcome, RuntimeError, FALLBACK_REPLY};
pub use tool::{Tool, ToolDefinition, ToolFunction, ToolRegistry};
