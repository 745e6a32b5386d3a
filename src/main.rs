//! Modebot - multi-mode conversational front-end
//!
//! Routes each user's events through a per-session state machine and
//! answers with model completions shaped by file-based prompts.

mod api;
mod catalog;
mod config;
mod handlers;
mod llm;
mod resources;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{LoggingService, OpenAIService};
use resources::ResourceCatalog;
use runtime::{ConversationRouter, LlmCompletionClient, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modebot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;

    if config.llm.api_key.is_none() {
        tracing::warn!("No completion API key configured. Set OPENAI_API_KEY or LLM_GATEWAY.");
    }

    let llm = Arc::new(LoggingService::new(Arc::new(OpenAIService::new(&config.llm)?)));
    tracing::info!(
        model = %config.llm.model,
        temperature = config.llm.temperature,
        timeout_secs = config.llm.timeout.as_secs(),
        "Completion client initialized"
    );
    let completion = Arc::new(LlmCompletionClient::new(
        llm,
        config.llm.temperature,
        config.llm.timeout,
    ));

    if !config.resources_dir.is_dir() {
        tracing::warn!(
            path = %config.resources_dir.display(),
            "Resource directory missing; built-in messages and prompts will be used"
        );
    }
    let resources = Arc::new(ResourceCatalog::new(&config.resources_dir));

    let sessions = SessionManager::new(ConversationRouter::new(resources, completion));
    let state = AppState::new(sessions);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Modebot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
