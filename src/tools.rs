//! Tool implementations for the chat backend

mod calculator;
#[cfg(test)]
mod proptests;
mod weather;

pub use calculator::CalculatorTool;
pub use weather::WeatherTool;

pub(crate) use calculator::is_allowed_expression;
pub(crate) use weather::{title_case, WEATHER_TABLE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Trait for tools the model may ask to be invoked
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a registry
    fn name(&self) -> &'static str;

    /// Tool description for model prompting
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn run(&self, input: Value) -> ToolOutput;
}

/// Immutable name-to-tool mapping, populated once at startup
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the two built-in tools
    pub fn builtin() -> Self {
        Self::from_tools(vec![Arc::new(WeatherTool), Arc::new(CalculatorTool)])
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            tools: tools.into_iter().map(|t| (t.name(), t)).collect(),
        }
    }

    /// Look up a tool by name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get all tool definitions for the model, in name order
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        let mut defs: Vec<_> = self
            .tools
            .values()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name; None means the name is not registered
    pub async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        match self.lookup(name) {
            Some(tool) => Some(tool.run(input).await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_builtin_registry_has_both_tools() {
        let registry = ToolRegistry::builtin();
        assert!(registry.lookup("get_weather_info").is_some());
        assert!(registry.lookup("calculate_math").is_some());
        assert!(registry.lookup("launch_missiles").is_none());
    }

    #[test]
    fn test_definitions_are_name_ordered() {
        let registry = ToolRegistry::builtin();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "calculate_math");
        assert_eq!(defs[1].name, "get_weather_info");
        for def in &defs {
            assert!(!def.description.is_empty());
            assert_eq!(def.input_schema["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_none() {
        let registry = ToolRegistry::builtin();
        assert!(registry.execute("nope", json!({})).await.is_none());
    }
}
