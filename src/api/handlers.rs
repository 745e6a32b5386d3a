//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ErrorResponse, InboundEvent, SessionSnapshot};
use super::AppState;
use crate::state_machine::{RenderInstruction, SessionId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inspection
        .route("/api/sessions/:id", get(get_session))
        // Inbound user interactions
        .route("/api/sessions/:id/events", post(post_event))
        // Notices and replies as they happen
        .route("/api/sessions/:id/stream", get(stream_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<InboundEvent>,
) -> Result<Json<RenderInstruction>, AppError> {
    let event = req
        .into_event()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let render = state
        .sessions
        .dispatch(&SessionId::new(id), event)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(render))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state
        .sessions
        .snapshot(&SessionId::new(id.clone()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("No active session: {id}")))?;

    Ok(Json(SessionSnapshot::from(session)))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = SessionId::new(id);

    // Subscribe before reading state so nothing falls between the two
    let broadcast_rx = state
        .sessions
        .subscribe(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No active session: {session_id}")))?;
    let snapshot = state
        .sessions
        .snapshot(&session_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map(SessionSnapshot::from);

    Ok(sse_stream(snapshot, broadcast_rx))
}

async fn get_version() -> &'static str {
    concat!("modebot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
