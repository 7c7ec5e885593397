/// jambcbt: a JAMB CBT practice library
///
/// This library provides the core functionality for a JAMB UTME practice
/// application: a local question bank with tiered upstream sourcing, a
/// spaced-repetition flashcard scheduler, an AI study assistant, and a web
/// API for all of it.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Data structures for questions, flashcards, and study records
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `scheduler`: The spaced-repetition review policy
/// - `sourcing`: The tiered question-sourcing engine
/// - `clients`: Upstream question bank and AI provider clients
/// - `handlers`: Axum request handlers
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum, rooted at `/api`:
/// questions (fetch, generate, sync), flashcards (CRUD, due queue,
/// review), the AI assistant (ask, settings, history), novel analyses,
/// and session records.

/// Database connection module
pub mod db;

/// Configuration loading and merging
pub mod config;

/// API error types
pub mod errors;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Spaced-repetition scheduling policy
pub mod scheduler;

/// Tiered question sourcing
pub mod sourcing;

/// Upstream HTTP clients
pub mod clients;

/// Request and response DTOs
pub mod dto;

/// Request handlers
pub mod handlers;

/// Shared application state
pub mod state;

/// The fixed subject registry
pub mod subjects;

/// Prescribed-text question supplement
pub mod supplement;

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use handlers::*;
use state::AppState;

/// Creates the application router with all routes
///
/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The shared application state given to all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and a permissive CORS layer
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_handler))
        // The fixed subject registry
        .route("/api/subjects", get(get_subjects_handler))
        // Question bank statistics
        .route("/api/stats", get(get_stats_handler))
        // Batch question fetch
        .route("/api/questions", get(get_questions_handler))
        // Single-question fetch with a hard error path
        .route("/api/questions/one", get(get_one_question_handler))
        // Explicit AI question generation
        .route("/api/questions/generate", post(generate_questions_handler))
        // Upstream sync into the local bank
        .route("/api/questions/sync", post(sync_questions_handler))
        // Flashcard listing and creation
        .route(
            "/api/flashcards",
            get(get_flashcards_handler).post(create_flashcard_handler),
        )
        // The due-review queue, weakest first
        .route("/api/flashcards/due", get(get_due_flashcards_handler))
        // AI flashcard generation
        .route("/api/flashcards/generate", post(generate_flashcards_handler))
        // Flashcard deletion
        .route("/api/flashcards/{id}", delete(delete_flashcard_handler))
        // Recording a review
        .route("/api/flashcards/{id}/review", post(review_flashcard_handler))
        // The AI study assistant
        .route("/api/ai/ask", post(ask_ai_handler))
        .route(
            "/api/ai/settings",
            get(get_ai_settings_handler).put(update_ai_settings_handler),
        )
        .route("/api/ai/history", delete(clear_ai_history_handler))
        // Novel analyses
        .route(
            "/api/novels",
            post(create_novel_handler).get(get_novels_handler),
        )
        .route("/api/novels/{id}", get(get_novel_handler))
        // Session records
        .route(
            "/api/sessions",
            post(create_session_handler).get(get_sessions_handler),
        )
        // Allow the browser client to call from any origin
        .layer(CorsLayer::permissive())
        // Add the shared state to the application
        .with_state(state)
}

/// Runs the embedded migrations
///
/// This function applies all database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Panics
///
/// This function will panic if the migrations fail to run
pub fn run_migrations(conn: &mut diesel::SqliteConnection) {
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    // Run all pending migrations
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
}
