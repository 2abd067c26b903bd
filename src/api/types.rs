//! API request and response types

use crate::session::Message;
use serde::{Deserialize, Serialize};

fn default_session_id() -> String {
    "default".to_string()
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    pub text: String,
}

/// Response for one completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Response with a session's full history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Build metadata
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub model: &'static str,
}
