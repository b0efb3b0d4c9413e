use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{AskRequest, AskResponse, SessionView};
use super::error::ChatError;
use super::services::{ask, remaining};
use crate::state::AppState;

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/sessions/:id", get(get_session))
        .route(
            "/chat/sessions/:id/messages",
            post(post_message).delete(clear_messages),
        )
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| reject(ChatError::SessionNotFound(id)))?;

    Ok(Json(SessionView {
        id,
        food_name: session.record.food_name.clone(),
        remaining_questions: remaining(&session, state.config.max_chat_questions),
        messages: session.messages,
    }))
}

#[instrument(skip(state, payload))]
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let answer = ask(&state, id, &payload.question).await.map_err(reject)?;
    info!(session_id = %id, remaining = answer.remaining_questions, "chat answered");
    Ok(Json(AskResponse {
        reply: answer.reply,
        remaining_questions: answer.remaining_questions,
    }))
}

#[instrument(skip(state))]
pub async fn clear_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.sessions.clear(id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn reject(e: ChatError) -> (StatusCode, String) {
    let status = match e {
        ChatError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatError::EmptyQuestion => StatusCode::BAD_REQUEST,
        ChatError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        ChatError::ExternalService(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        warn!(error = %e, "chat request failed");
    }
    (status, e.to_string())
}
