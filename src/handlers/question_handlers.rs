use axum::{
    Json,
    extract::{Query, State},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::{GenerateQuestionsDto, QuestionQueryDto, SubjectDto, SyncRequestDto};
use crate::errors::ApiError;
use crate::models::Question;
use crate::repo;
use crate::sourcing::{self, BatchRequest};
use crate::state::AppState;
use crate::subjects;

/// Default batch size when the client names none
const DEFAULT_QUESTION_COUNT: usize = 40;

/// Default per-subject fetch size for a sync
const DEFAULT_SYNC_COUNT: usize = 100;

/// Handler for the health check
///
/// This function handles GET requests to `/api/health`.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

/// Handler for listing the subject registry
///
/// This function handles GET requests to `/api/subjects`.
pub async fn get_subjects_handler() -> Json<Vec<SubjectDto>> {
    let listed = subjects::SUBJECTS
        .iter()
        .map(|subject| SubjectDto {
            id: subject.id.to_string(),
            name: subject.name.to_string(),
        })
        .collect();

    Json(listed)
}

/// Handler for question-bank statistics
///
/// This function handles GET requests to `/api/stats`. Every registry
/// subject appears in the response, zero-count ones included.
#[instrument(skip(state))]
pub async fn get_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let counted: BTreeMap<String, i64> = repo::count_questions_by_subject(&state.pool)
        .await
        .map_err(ApiError::Database)?
        .into_iter()
        .collect();

    let mut per_subject = serde_json::Map::new();
    for subject in subjects::SUBJECTS {
        let count = counted.get(subject.id).copied().unwrap_or(0);
        per_subject.insert(subject.id.to_string(), serde_json::json!(count));
    }

    let total = repo::count_all_questions(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(serde_json::json!({
        "subjects": per_subject,
        "total": total,
    })))
}

/// Handler for fetching a batch of questions
///
/// This function handles GET requests to `/api/questions`. The subject is
/// required; count defaults to 40. `mode=exam` turns on exam construction,
/// which pads English papers with the prescribed-text supplement.
///
/// ### Returns
///
/// The assembled questions as JSON, possibly fewer than requested
#[instrument(skip(state, query), fields(subject = ?query.subject, count = ?query.count))]
pub async fn get_questions_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQueryDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subject = query
        .subject
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Subject is required".to_string()))?;

    let request = BatchRequest {
        subject,
        count: query.count.unwrap_or(DEFAULT_QUESTION_COUNT),
        topic: query.topic.as_deref(),
        year: query.year.as_deref(),
        exam_mode: query.mode.as_deref() == Some("exam"),
    };

    let (questions, source) = sourcing::load_batch(&state, &request).await?;

    Ok(Json(serde_json::json!({
        "total": questions.len(),
        "data": questions,
        "source": source.as_str(),
    })))
}

/// Handler for fetching a single random question
///
/// This function handles GET requests to `/api/questions/one`. Unlike the
/// batch endpoint this fails loudly when nothing could be sourced.
#[instrument(skip(state, query), fields(subject = ?query.subject))]
pub async fn get_one_question_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQueryDto>,
) -> Result<Json<Question>, ApiError> {
    let subject = query
        .subject
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Subject is required".to_string()))?;

    let question = sourcing::load_single(&state, subject, query.year.as_deref()).await?;

    Ok(Json(question))
}

/// Handler for AI question generation
///
/// This function handles POST requests to `/api/questions/generate`.
/// Requires a subject and a configured AI provider; the requested count is
/// capped at 20.
#[instrument(skip(state, payload), fields(subject = ?payload.subject, count = ?payload.count))]
pub async fn generate_questions_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateQuestionsDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subject = payload
        .subject
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Subject is required".to_string()))?;

    let count = payload.count.unwrap_or(10).min(sourcing::GENERATE_CAP);

    let questions =
        sourcing::generate_ai_questions(&state, subject, payload.topic.as_deref(), count).await?;

    info!("Generated {} questions for {}", questions.len(), subject);

    Ok(Json(serde_json::json!({
        "count": questions.len(),
        "message": format!("Generated {} questions for {}", questions.len(), subject),
        "data": questions,
    })))
}

/// Handler for syncing the local bank from upstream
///
/// This function handles POST requests to `/api/questions/sync`. With no
/// subject every registry subject is synced; each reports how many
/// questions were fetched and how many were saved or refreshed.
#[instrument(skip(state, payload), fields(subject = ?payload.subject))]
pub async fn sync_questions_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SyncRequestDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let targets: Vec<String> = match payload.subject {
        Some(subject) => vec![subject],
        None => subjects::SUBJECTS
            .iter()
            .map(|subject| subject.id.to_string())
            .collect(),
    };
    let count = payload.count.unwrap_or(DEFAULT_SYNC_COUNT);

    let mut results = serde_json::Map::new();
    for subject in &targets {
        let (fetched, saved) = sourcing::sync_subject(&state, subject, count).await?;
        results.insert(
            subject.clone(),
            serde_json::json!({"fetched": fetched, "saved": saved}),
        );
    }

    info!("Synced {} subjects", targets.len());

    Ok(Json(serde_json::json!({
        "message": format!("Synced {} subjects", targets.len()),
        "results": results,
    })))
}
