/// Common test utilities for jambcbt integration tests
///
/// This file contains shared functions for all integration tests: test
/// application setup against an in-memory database and helpers for
/// seeding the question bank and creating flashcards through the API.
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use jambcbt::{create_app, db::init_pool, models::Question, state::AppState};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::Service;

/// Creates a test application with an in-memory SQLite database
///
/// The database uses a uniquely named shared-cache memory URI so every
/// pooled connection sees the same data, and each test gets its own
/// isolated database with no cleanup needed.
///
/// ### Returns
///
/// The shared state and an Axum Router with all routes registered
pub fn create_test_app() -> (Arc<AppState>, Router) {
    let url = format!(
        "file:integration_{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4().simple()
    );
    let pool = Arc::new(init_pool(&url));

    // Run migrations on the in-memory database to set up the schema
    let conn = &mut pool.get().unwrap();
    jambcbt::run_migrations(conn);

    let state = Arc::new(AppState::offline(pool));
    (state.clone(), create_app(state))
}

/// Seeds the local question bank directly through the repository layer
///
/// There is no public endpoint for inserting arbitrary questions, so
/// tests that need a populated bank write to it the way the sourcing
/// engine does.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `subject` - The subject every seeded question belongs to
/// * `count` - How many questions to seed
#[allow(dead_code)]
pub async fn seed_questions(state: &AppState, subject: &str, count: usize) {
    let batch: Vec<Question> = (0..count)
        .map(|index| {
            Question::new(
                Some(format!("seed-{}", index)),
                subject.to_string(),
                Some("Seed Topic".to_string()),
                format!("Seeded question number {}?", index),
                json!({"a": "First", "b": "Second", "c": "Third", "d": "Fourth"}),
                "a".to_string(),
                Some("Because the first option is right.".to_string()),
                "utme".to_string(),
                Some("2020".to_string()),
                None,
                false,
            )
        })
        .collect();
    let saved = jambcbt::repo::save_questions(&state.pool, &batch)
        .await
        .unwrap();
    assert_eq!(saved, count);
}

/// Creates a flashcard via the API
///
/// ### Arguments
///
/// * `app` - The test application
/// * `subject` - The subject for the card
/// * `front` - The prompt side
/// * `back` - The answer side
///
/// ### Returns
///
/// The created flashcard as a JSON Value
#[allow(dead_code)]
pub async fn create_flashcard(
    app: &mut Router,
    subject: &str,
    front: &str,
    back: &str,
) -> Value {
    let request = Request::builder()
        .uri("/api/flashcards")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "subject": subject,
                "topic": "General",
                "front": front,
                "back": back
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Sends a GET request and parses the JSON response body
///
/// Asserts a 200 OK status before parsing.
#[allow(dead_code)]
pub async fn get_json(app: &mut Router, uri: &str) -> Value {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.call(request).await.unwrap();

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    assert_eq!(
        parts.status,
        StatusCode::OK,
        "Expected 200 OK status, instead got {}: {}",
        parts.status,
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).unwrap()
}
