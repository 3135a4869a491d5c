//! Trait-based tool contract and explicit registry.
//!
//! Tools are a closed, named set registered at startup; the runtime dispatches
//! to them by name when the model requests a call. Nothing is discovered by
//! introspection.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait implemented by all callable capabilities exposed to the model.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name for routing (used in model function calling).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema for this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Executes the tool with the given JSON arguments.
    async fn invoke(
        &self,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// Function-calling tool definition in the chat-completions wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Registry of tools that can be dispatched by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Returns the names of all registered tools (for status and logging).
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Tool definitions for model function calling.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                tool_type: "function".to_string(),
                function: ToolFunction {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait::async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes its arguments back."
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }
        async fn invoke(
            &self,
            args: serde_json::Value,
        ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
            Ok(args)
        }
    }

    #[test]
    fn registry_routes_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.tool_names(), vec!["echo".to_string()]);
    }

    #[test]
    fn definitions_use_function_calling_shape() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].tool_type, "function");
        assert_eq!(defs[0].function.name, "echo");
        let wire = serde_json::to_value(&defs[0]).unwrap();
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["parameters"]["type"], "object");
    }
}
