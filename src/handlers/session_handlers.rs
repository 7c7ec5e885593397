use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::CreateSessionDto;
use crate::errors::ApiError;
use crate::models::Session;
use crate::repo;
use crate::state::AppState;

/// Handler for recording a finished session
///
/// This function handles POST requests to `/api/sessions`.
#[instrument(skip(state, payload), fields(mode = %payload.mode))]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionDto>,
) -> Result<Json<Session>, ApiError> {
    if payload.subjects.is_empty() {
        return Err(ApiError::BadRequest(
            "A session needs at least one subject".to_string(),
        ));
    }

    let session = Session::new(
        payload.mode,
        serde_json::json!(payload.subjects),
        payload.breakdown,
        payload.correct_count,
        payload.wrong_count,
        payload.score,
        payload.duration_secs,
    );
    let session = repo::create_session(&state.pool, &session)
        .await
        .map_err(ApiError::Database)?;

    info!("Recorded {} session {}", session.get_mode(), session.get_id());

    Ok(Json(session))
}

/// Handler for listing recent sessions
///
/// This function handles GET requests to `/api/sessions`.
#[instrument(skip(state))]
pub async fn get_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = repo::get_sessions(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(sessions))
}
