use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::clients::SourceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Resource not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("No AI provider is configured")]
    AiUnavailable,
    #[error("Upstream rate limit exceeded, try again shortly")]
    RateLimited,
    #[error("Upstream request failed: {0}")]
    UpstreamFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::AiUnavailable => (
                StatusCode::BAD_REQUEST,
                "No AI provider is configured".to_string(),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Upstream rate limit exceeded, try again shortly".to_string(),
            ),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::ConfigMissing(what) => {
                ApiError::BadRequest(format!("{} is not configured", what))
            }
            SourceError::RateLimited => ApiError::RateLimited,
            SourceError::Malformed(msg) => ApiError::UpstreamFailed(msg),
            SourceError::Timeout | SourceError::Http { .. } | SourceError::Network(_) => {
                ApiError::UpstreamFailed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A missing AI provider is the caller's configuration problem, not a
    /// server outage
    #[test]
    fn test_missing_ai_provider_is_a_client_error() {
        let response = ApiError::AiUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rate_limit_maps_to_too_many_requests() {
        let response = ApiError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
