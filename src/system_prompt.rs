//! Fixed system instruction sent with every model request

use crate::tools::ToolRegistry;
use std::fmt::Write;

const INSTRUCTIONS: &str = "\
You are a helpful AI assistant with access to tools. When users ask about:
- Weather in any city: USE the get_weather_info tool
- Mathematical calculations: USE the calculate_math tool

IMPORTANT: You MUST use the appropriate tool when the user's request matches these categories.
Don't just describe what the tool would do - actually call it!";

/// Render the system instruction, with the tool list taken from the registry
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\nAvailable tools:\n");
    for def in tools.definitions() {
        let _ = writeln!(prompt, "- {}: {}", def.name, def.description);
    }
    prompt.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_builtin_tools() {
        let prompt = build_system_prompt(&ToolRegistry::builtin());
        assert!(prompt.contains("get_weather_info"));
        assert!(prompt.contains("calculate_math"));
        assert!(prompt.contains("MUST use the appropriate tool"));
    }
}
