//! Dispatch engine
//!
//! Orchestrates one conversational turn: builds the prompt window, invokes
//! the model with tool-calling enabled, executes requested tools, folds the
//! results back through a second model call or the heuristic fallback, and
//! records both turn messages. `process_turn` is total: every internal
//! failure is rendered into the reply text at this boundary, never raised
//! to the presentation layer.

use crate::extract::{detect_intent, extract_city, extract_expression, Intent};
use crate::llm::{
    GeminiService, LlmError, LlmMessage, LlmRequest, LlmResponse, LlmService, LoggingService,
    MessageRole,
};
use crate::session::{Message, Role, SessionStore};
use crate::system_prompt::build_system_prompt;
use crate::tools::ToolRegistry;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Messages of context sent to the model per turn
pub const CONTEXT_WINDOW_MESSAGES: usize = 10;

/// Fixed sampling temperature
pub const MODEL_TEMPERATURE: f32 = 0.7;

const TOOL_RESULT_SEPARATOR: &str = " | ";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const WEATHER_CLARIFY: &str =
    "I'd be happy to help with weather information! Please specify which city you'd like to know about.";
const MATH_CLARIFY: &str =
    "I'd be happy to help with calculations! Please provide a mathematical expression.";

/// Engine construction failure, the only error surfaced to the caller
#[derive(Debug, Error)]
pub enum InitError {
    #[error("GEMINI_API_KEY must be provided either as a parameter or an environment variable")]
    MissingApiKey,
    #[error("failed to initialize model client: {0}")]
    Client(#[from] LlmError),
}

/// Turn-level failure, converted to reply text at the boundary
#[derive(Debug, Error)]
enum TurnError {
    #[error("{0}")]
    Model(#[from] LlmError),
}

/// Engine configuration. The API key is the only secret: an explicit value
/// wins, then the `GEMINI_API_KEY` environment variable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    /// Timeout applied around each model call
    pub timeout: Duration,
}

impl EngineConfig {
    #[allow(dead_code)] // Constructor for callers that pass the key explicitly
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            api_key: None,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn resolve_api_key(&self) -> Result<String, InitError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(InitError::MissingApiKey)
    }
}

/// Conversation-and-tool-dispatch session manager
pub struct ChatEngine {
    llm: Arc<dyn LlmService>,
    tools: ToolRegistry,
    sessions: SessionStore,
    system_prompt: String,
}

impl ChatEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, InitError> {
        let api_key = config.resolve_api_key()?;
        let gemini = GeminiService::new(api_key, config.timeout)?;
        let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
        Ok(Self::with_service(llm))
    }

    /// Build an engine around any model service; the seam used by tests
    pub fn with_service(llm: Arc<dyn LlmService>) -> Self {
        let tools = ToolRegistry::builtin();
        let system_prompt = build_system_prompt(&tools);
        Self {
            llm,
            tools,
            sessions: SessionStore::new(),
            system_prompt,
        }
    }

    /// Process one turn. Total: failures become reply text. The turn lock
    /// serializes same-session turns; distinct sessions run in parallel.
    pub async fn process_turn(&self, session_id: &str, user_text: &str) -> String {
        let turn_lock = self.sessions.turn_lock(session_id);
        let _guard = turn_lock.lock().await;

        match self.run_turn(session_id, user_text).await {
            Ok(reply) => {
                self.sessions.append(session_id, Message::user(user_text));
                self.sessions
                    .append(session_id, Message::assistant(reply.clone()));
                reply
            }
            Err(e) => {
                tracing::error!(session = %session_id, error = %e, "Turn failed");
                let reply = format!("I encountered an error: {e}");
                self.sessions.append(session_id, Message::user(user_text));
                self.sessions
                    .append(session_id, Message::assistant_error(reply.clone()));
                reply
            }
        }
    }

    /// Full history for a session, error turns included
    pub fn history(&self, session_id: &str) -> Vec<Message> {
        self.sessions.all(session_id)
    }

    /// Drop a session entirely
    pub fn clear_history(&self, session_id: &str) {
        self.sessions.clear(session_id);
    }

    async fn run_turn(&self, session_id: &str, user_text: &str) -> Result<String, TurnError> {
        let mut messages: Vec<LlmMessage> = self
            .sessions
            .window(session_id, CONTEXT_WINDOW_MESSAGES)
            .iter()
            .filter_map(stored_to_llm)
            .collect();
        messages.push(LlmMessage::user(user_text));

        let request = LlmRequest {
            system: self.system_prompt.clone(),
            messages: messages.clone(),
            tools: self.tools.definitions(),
            temperature: MODEL_TEMPERATURE,
        };
        let response = self.llm.complete(&request).await?;

        if response.has_tool_calls() {
            return self.finish_tool_calls(messages, &response).await;
        }

        // No structured tool-call signal: inspect the user text ourselves
        Ok(match detect_intent(user_text) {
            Some(Intent::Weather) => match extract_city(user_text) {
                Some(city) => {
                    self.invoke_fallback_tool(
                        "get_weather_info",
                        json!({ "city": city }),
                        "I tried to get weather information but encountered an error",
                    )
                    .await
                }
                None => WEATHER_CLARIFY.to_string(),
            },
            Some(Intent::Math) => match extract_expression(user_text) {
                Some(expression) => {
                    self.invoke_fallback_tool(
                        "calculate_math",
                        json!({ "expression": expression }),
                        "I tried to calculate that but encountered an error",
                    )
                    .await
                }
                None => MATH_CLARIFY.to_string(),
            },
            None => response.text(),
        })
    }

    /// Execute every requested tool and fold the joined results back
    /// through a second model call
    async fn finish_tool_calls(
        &self,
        mut messages: Vec<LlmMessage>,
        response: &LlmResponse,
    ) -> Result<String, TurnError> {
        let mut results = Vec::new();
        for (name, input) in response.tool_calls() {
            let result = match self.tools.execute(name, input.clone()).await {
                Some(out) if out.success => out.output,
                Some(out) => format!("Tool error: {}", out.output),
                None => format!("Tool error: unknown tool {name}"),
            };
            results.push(result);
        }

        if results.is_empty() {
            return Ok(response.text());
        }

        messages.push(LlmMessage {
            role: MessageRole::Assistant,
            content: response.content.clone(),
        });
        messages.push(LlmMessage::user(format!(
            "Here are the tool results: {}",
            results.join(TOOL_RESULT_SEPARATOR)
        )));

        let request = LlmRequest {
            system: self.system_prompt.clone(),
            messages,
            tools: Vec::new(),
            temperature: MODEL_TEMPERATURE,
        };
        let final_response = self.llm.complete(&request).await?;
        Ok(final_response.text())
    }

    /// Direct tool invocation on behalf of a heuristic match; failure is
    /// rendered as apologetic text, never an aborted turn
    async fn invoke_fallback_tool(
        &self,
        name: &str,
        input: serde_json::Value,
        apology: &str,
    ) -> String {
        match self.tools.execute(name, input).await {
            Some(out) if out.success => out.output,
            Some(out) => format!("{apology}: {}", out.output),
            None => format!("{apology}: unknown tool {name}"),
        }
    }
}

fn stored_to_llm(message: &Message) -> Option<LlmMessage> {
    match message.role {
        Role::User => Some(LlmMessage::user(message.content.clone())),
        Role::Assistant => Some(LlmMessage::assistant(message.content.clone())),
        // System text travels out-of-band in the request
        Role::System => None,
    }
}
