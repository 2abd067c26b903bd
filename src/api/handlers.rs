//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, HistoryResponse, SuccessResponse, VersionResponse};
use super::AppState;
use crate::llm::GEMINI_MODEL;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/sessions/:id/history", get(history))
        .route("/api/sessions/:id/clear", post(clear))
        .route("/version", get(version))
        .with_state(state)
}

/// One conversational turn. Always 200: the engine renders failures
/// into the reply text.
async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let reply = state.engine.process_turn(&req.session_id, &req.text).await;
    Json(ChatResponse { reply })
}

async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.engine.history(&session_id),
    })
}

async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SuccessResponse> {
    state.engine.clear_history(&session_id);
    Json(SuccessResponse { success: true })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        model: GEMINI_MODEL,
    })
}
