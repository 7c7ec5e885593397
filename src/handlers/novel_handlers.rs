use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::ai;
use crate::dto::CreateNovelDto;
use crate::errors::ApiError;
use crate::models::Novel;
use crate::repo;
use crate::sourcing;
use crate::state::AppState;

/// Handler for generating and storing a novel analysis
///
/// This function handles POST requests to `/api/novels`. The analysis is
/// produced by the configured AI provider; unlike flashcard generation an
/// unusable response is a hard error, since the caller gets nothing
/// otherwise.
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_novel_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateNovelDto>,
) -> Result<Json<Novel>, ApiError> {
    if payload.title.trim().is_empty() || payload.author.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Title and author must not be empty".to_string(),
        ));
    }

    let client = state.ai.as_ref().ok_or(ApiError::AiUnavailable)?;
    let (provider, model) = sourcing::resolve_ai_selection(&state).await?;

    let prompt = ai::novel_prompt(&payload.title, &payload.author);
    let analysis = client.chat(provider, &model, &[], &prompt).await?;

    if analysis.trim().is_empty() {
        return Err(ApiError::UpstreamFailed(
            "AI returned an empty analysis".to_string(),
        ));
    }

    let novel = Novel::new(payload.title, payload.author, analysis);
    let novel = repo::create_novel(&state.pool, &novel)
        .await
        .map_err(ApiError::Database)?;

    info!("Stored analysis for {}", novel.get_title());

    Ok(Json(novel))
}

/// Handler for listing stored novel analyses
///
/// This function handles GET requests to `/api/novels`.
#[instrument(skip(state))]
pub async fn get_novels_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Novel>>, ApiError> {
    let novels = repo::get_novels(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(novels))
}

/// Handler for fetching one stored analysis
///
/// This function handles GET requests to `/api/novels/{id}`.
#[instrument(skip(state), fields(novel_id = %id))]
pub async fn get_novel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Novel>, ApiError> {
    let novel = repo::get_novel(&state.pool, &id)
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(novel))
}
