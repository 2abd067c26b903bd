//! toolchat - conversational tool-dispatch demo backend
//!
//! A small chat service that forwards user text to a hosted model with
//! tool-calling enabled, executes the built-in weather and calculator
//! tools on request, and keeps per-session history in memory.

mod api;
mod engine;
mod extract;
mod llm;
mod session;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use engine::{ChatEngine, EngineConfig};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolchat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("CHAT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let config = EngineConfig::from_env();
    let engine = ChatEngine::new(&config)?;
    tracing::info!(model = %llm::GEMINI_MODEL, "Chat engine initialized");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(engine)).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("toolchat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
