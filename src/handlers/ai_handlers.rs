use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::clients::{AiProvider, ChatMessage};
use crate::dto::{AiSettingsResponseDto, AskAiDto, AskAiResponseDto, UpdateAiSettingsDto};
use crate::errors::ApiError;
use crate::repo;
use crate::sourcing;
use crate::state::AppState;

/// Handler for asking the AI assistant a question
///
/// This function handles POST requests to `/api/ai/ask`. Identical
/// questions are answered from a 7-day response cache; fresh answers are
/// appended to the stored conversation so follow-ups carry context.
#[instrument(skip(state, payload), fields(subject = ?payload.subject))]
pub async fn ask_ai_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskAiDto>,
) -> Result<Json<AskAiResponseDto>, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }

    let client = state.ai.as_ref().ok_or(ApiError::AiUnavailable)?;
    let (provider, model) = sourcing::resolve_ai_selection(&state).await?;

    let cache_key = response_cache_key(&payload, provider, &model);
    let now = chrono::Utc::now();

    match repo::get_cached_ai_response(&state.pool, &cache_key, now).await {
        Ok(Some(cached)) => {
            debug!("Serving AI response from cache");
            return Ok(Json(AskAiResponseDto {
                response: cached,
                cached: true,
            }));
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("AI cache read failed: {}", err),
    }

    let message = compose_message(&payload);

    let mut history = repo::load_history(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    let response = client.chat(provider, &model, &history, &message).await?;

    history.push(ChatMessage::user(message));
    history.push(ChatMessage::assistant(response.clone()));
    if let Err(err) = repo::save_history(&state.pool, &history).await {
        tracing::warn!("Failed to save conversation history: {}", err);
    }
    if let Err(err) = repo::cache_ai_response(&state.pool, &cache_key, &response).await {
        tracing::warn!("Failed to cache AI response: {}", err);
    }

    Ok(Json(AskAiResponseDto {
        response,
        cached: false,
    }))
}

/// Handler for reading the AI settings
///
/// This function handles GET requests to `/api/ai/settings`. When nothing
/// was stored yet the effective selection (first configured provider with
/// its default model) is reported.
#[instrument(skip(state))]
pub async fn get_ai_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AiSettingsResponseDto>, ApiError> {
    let available: Vec<String> = state
        .ai
        .as_ref()
        .map(|client| {
            client
                .available_providers()
                .iter()
                .map(|provider| provider.as_str().to_string())
                .collect()
        })
        .unwrap_or_default();

    let (provider, model) = match repo::get_ai_settings(&state.pool).await? {
        Some(stored) => stored,
        None => match sourcing::resolve_ai_selection(&state).await {
            Ok((provider, model)) => (provider.as_str().to_string(), model),
            // nothing configured at all; report the conventional default
            Err(_) => (
                AiProvider::Gemini.as_str().to_string(),
                AiProvider::Gemini.default_model().to_string(),
            ),
        },
    };

    Ok(Json(AiSettingsResponseDto {
        provider,
        model,
        available_providers: available,
    }))
}

/// Handler for updating the AI settings
///
/// This function handles PUT requests to `/api/ai/settings`. The provider
/// must be one the application knows; it need not have a key yet.
#[instrument(skip(state, payload), fields(provider = %payload.provider, model = %payload.model))]
pub async fn update_ai_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateAiSettingsDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if AiProvider::parse(&payload.provider).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Unknown provider: {}",
            payload.provider
        )));
    }
    if payload.model.trim().is_empty() {
        return Err(ApiError::BadRequest("Model must not be empty".to_string()));
    }

    repo::save_ai_settings(&state.pool, &payload.provider, &payload.model)
        .await
        .map_err(ApiError::Database)?;

    info!("AI settings updated to {}/{}", payload.provider, payload.model);

    Ok(Json(serde_json::json!({"status": "ok"})))
}

/// Handler for clearing the assistant conversation
///
/// This function handles DELETE requests to `/api/ai/history`.
#[instrument(skip(state))]
pub async fn clear_ai_history_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    repo::clear_history(&state.pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(serde_json::json!({"status": "ok"})))
}

/// Builds the message sent to the provider
///
/// The subject tag stays attached to the question even when surrounding
/// context is supplied, so a follow-up about a passage still tells the
/// model which subject it belongs to.
fn compose_message(payload: &AskAiDto) -> String {
    let mut message = payload.question.clone();
    if let Some(subject) = &payload.subject {
        message = format!("[Subject: {}] {}", subject, message);
    }
    if let Some(context) = &payload.context {
        message = format!("Context: {}\n\nQuestion: {}", context, message);
    }
    message
}

/// Builds the response-cache key for a question
///
/// Mirrors how responses are looked up: the leading slice of the question
/// plus subject, provider, and model, so a provider switch never serves
/// another model's answer.
fn response_cache_key(payload: &AskAiDto, provider: AiProvider, model: &str) -> String {
    let head: String = payload.question.chars().take(50).collect();
    format!(
        "ai-{}-{}-{}-{}",
        head,
        payload.subject.as_deref().unwrap_or("general"),
        provider.as_str(),
        model
    )
}
