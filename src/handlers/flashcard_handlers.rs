use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::clients::ai;
use crate::dto::{
    CreateFlashcardDto, FlashcardQueryDto, GenerateFlashcardsDto, ReviewFlashcardDto,
};
use crate::errors::ApiError;
use crate::models::{Flashcard, FlashcardSource};
use crate::repo;
use crate::sourcing;
use crate::state::AppState;

/// Default number of flashcards one generate request produces
const DEFAULT_GENERATE_COUNT: usize = 5;

/// Handler for listing flashcards
///
/// This function handles GET requests to `/api/flashcards`, optionally
/// filtered by subject and topic.
#[instrument(skip(state, query))]
pub async fn get_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlashcardQueryDto>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let cards = repo::get_flashcards(&state.pool, query.subject.as_deref(), query.topic.as_deref())
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(cards))
}

/// Handler for creating a flashcard
///
/// This function handles POST requests to `/api/flashcards`.
#[instrument(skip(state, payload), fields(subject = %payload.subject))]
pub async fn create_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateFlashcardDto>,
) -> Result<Json<Flashcard>, ApiError> {
    if payload.front.trim().is_empty() || payload.back.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Flashcard front and back must not be empty".to_string(),
        ));
    }

    let card = Flashcard::new(
        payload.subject,
        payload.topic,
        payload.front,
        payload.back,
        FlashcardSource::User,
    );
    let card = repo::create_flashcard(&state.pool, &card)
        .await
        .map_err(ApiError::Database)?;

    info!("Created flashcard {}", card.get_id());

    Ok(Json(card))
}

/// Handler for deleting a flashcard
///
/// This function handles DELETE requests to `/api/flashcards/{id}`.
#[instrument(skip(state), fields(card_id = %id))]
pub async fn delete_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = repo::delete_flashcard(&state.pool, &id)
        .await
        .map_err(ApiError::Database)?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(Json(serde_json::json!({"deleted": true})))
}

/// Handler for the due-review queue
///
/// This function handles GET requests to `/api/flashcards/due`. Cards come
/// back weakest first.
#[instrument(skip(state))]
pub async fn get_due_flashcards_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let due = repo::get_due_flashcards(&state.pool, chrono::Utc::now())
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(due))
}

/// Handler for recording a flashcard review
///
/// This function handles POST requests to `/api/flashcards/{id}/review`.
/// Reviewing a card that no longer exists is a success no-op, so a client
/// replaying a queued review after the card was deleted does not error.
#[instrument(skip(state, payload), fields(card_id = %id, correct = payload.correct))]
pub async fn review_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewFlashcardDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let card = repo::get_flashcard(&state.pool, &id)
        .await
        .map_err(ApiError::Database)?;

    let Some(mut card) = card else {
        debug!("Review for missing card {}, ignoring", id);
        return Ok(Json(serde_json::json!({"status": "ok", "card": null})));
    };

    card.apply_review(payload.correct, payload.difficulty, chrono::Utc::now());
    repo::update_flashcard_review(&state.pool, &card)
        .await
        .map_err(ApiError::Database)?;

    info!(
        "Reviewed card {}: mastery {}, next interval {}d",
        card.get_id(),
        card.get_mastery(),
        card.get_interval_days()
    );

    Ok(Json(serde_json::json!({"status": "ok", "card": card})))
}

/// Handler for AI flashcard generation
///
/// This function handles POST requests to `/api/flashcards/generate`.
/// Malformed model output degrades to an empty list rather than erroring;
/// generation here is a convenience, not a contract.
#[instrument(skip(state, payload), fields(subject = %payload.subject, topic = %payload.topic))]
pub async fn generate_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateFlashcardsDto>,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let client = state.ai.as_ref().ok_or(ApiError::AiUnavailable)?;
    let (provider, model) = sourcing::resolve_ai_selection(&state).await?;

    let count = payload.count.unwrap_or(DEFAULT_GENERATE_COUNT);
    let prompt = ai::flashcard_prompt(&payload.subject, &payload.topic, count);

    let text = client.chat(provider, &model, &[], &prompt).await?;
    let cards = ai::parse_generated_flashcards(&text, &payload.subject, &payload.topic);

    if !cards.is_empty() {
        repo::create_flashcards(&state.pool, &cards)
            .await
            .map_err(ApiError::Database)?;
    }

    info!("Generated {} flashcards for {}", cards.len(), payload.subject);

    Ok(Json(cards))
}
