/// Integration tests for the flashcard endpoints
///
/// This file covers creation and validation, listing with filters, the
/// due queue, review scheduling through the API, and deletion.
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::Service;

mod common;
use common::*;

/// Helper to post a review for a card
async fn review_card(app: &mut axum::Router, card_id: &str, correct: bool) -> Value {
    let request = Request::builder()
        .uri(format!("/api/flashcards/{}/review", card_id))
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(format!(r#"{{"correct":{}}}"#, correct)))
        .unwrap();

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

/// Tests creating a flashcard and listing it back with filters
#[tokio::test]
async fn test_create_and_list_flashcards() {
    let (_state, mut app) = create_test_app();

    let card = create_flashcard(&mut app, "biology", "What is osmosis?", "Water movement").await;
    assert_eq!(card["subject"], "biology");
    assert_eq!(card["source"], "user");
    assert_eq!(card["mastery"], 0);

    let listed = get_json(&mut app, "/api/flashcards?subject=biology").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let listed = get_json(&mut app, "/api/flashcards?subject=physics").await;
    assert!(listed.as_array().unwrap().is_empty());
}

/// Tests that a card with an empty front is rejected
#[tokio::test]
async fn test_create_rejects_empty_front() {
    let (_state, mut app) = create_test_app();

    let request = Request::builder()
        .uri("/api/flashcards")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"subject":"biology","topic":"Cells","front":"  ","back":"text"}"#,
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Tests that a correct review reschedules the card out of the due queue
#[tokio::test]
async fn test_correct_review_reschedules() {
    let (_state, mut app) = create_test_app();
    let card = create_flashcard(&mut app, "physics", "Unit of force?", "Newton").await;
    let id = card["id"].as_str().unwrap().to_string();

    let due = get_json(&mut app, "/api/flashcards/due").await;
    assert_eq!(due.as_array().unwrap().len(), 1);

    let reviewed = review_card(&mut app, &id, true).await;
    assert_eq!(reviewed["card"]["review_count"], 1);
    assert_eq!(reviewed["card"]["correct_count"], 1);
    assert_eq!(reviewed["card"]["streak"], 1);
    assert_eq!(reviewed["card"]["mastery"], 100);
    assert!(reviewed["card"]["next_review"].is_string());

    let due = get_json(&mut app, "/api/flashcards/due").await;
    assert!(due.as_array().unwrap().is_empty());
}

/// Tests that an incorrect review resets the streak and shrinks the ease
#[tokio::test]
async fn test_incorrect_review_resets_progress() {
    let (_state, mut app) = create_test_app();
    let card = create_flashcard(&mut app, "physics", "Unit of charge?", "Coulomb").await;
    let id = card["id"].as_str().unwrap().to_string();

    review_card(&mut app, &id, true).await;
    let reviewed = review_card(&mut app, &id, false).await;

    assert_eq!(reviewed["card"]["streak"], 0);
    assert_eq!(reviewed["card"]["interval_days"], 1);
    assert_eq!(reviewed["card"]["mastery"], 50);
    let ease = reviewed["card"]["ease_factor"].as_f64().unwrap();
    assert!(ease < 2.5);
}

/// Tests that reviewing a nonexistent card succeeds without a card
#[tokio::test]
async fn test_review_missing_card() {
    let (_state, mut app) = create_test_app();

    let body = review_card(&mut app, "missing-card", true).await;
    assert_eq!(body["status"], "ok");
    assert!(body["card"].is_null());
}

/// Tests deleting a flashcard, and that deleting it again is a 404
#[tokio::test]
async fn test_delete_flashcard() {
    let (_state, mut app) = create_test_app();
    let card = create_flashcard(&mut app, "biology", "front", "back").await;
    let id = card["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/api/flashcards/{}", id))
        .method("DELETE")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri(format!("/api/flashcards/{}", id))
        .method("DELETE")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Tests that generation without an AI key is refused
#[tokio::test]
async fn test_generate_flashcards_unavailable() {
    let (_state, mut app) = create_test_app();

    let request = Request::builder()
        .uri("/api/flashcards/generate")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"subject":"biology","topic":"Cells","count":5}"#,
        ))
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
