/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: storing and
/// sampling questions, flashcard state, cached upstream batches, AI
/// settings and history, novel analyses, and finished sessions.
///
/// The repository pattern abstracts away the details of database access
/// and provides a clean API for the rest of the application to use.
mod ai_repo;
mod cache_repo;
mod flashcard_repo;
mod novel_repo;
mod question_repo;
mod session_repo;

// Re-export all repository functions
pub use ai_repo::*;
pub use cache_repo::*;
pub use flashcard_repo::*;
pub use novel_repo::*;
pub use question_repo::*;
pub use session_repo::*;

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use crate::db::{self, DbPool};
    use diesel_migrations::MigrationHarness;

    /// Sets up a test database with migrations applied
    ///
    /// ### Returns
    ///
    /// A database connection pool connected to the in-memory database
    pub fn setup_test_db() -> Arc<DbPool> {
        // Use a unique shared in-memory database for each test.
        // Plain ":memory:" gives each connection its own separate database,
        // so migrations run on one connection wouldn't be visible on others.
        // By using a unique URI with cache=shared, all connections in this pool
        // share the same in-memory database while remaining isolated from other tests.
        let unique_id = uuid::Uuid::new_v4();
        let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
        let pool = db::init_pool(&database_url);

        // Run migrations on the in-memory database
        let mut conn = pool.get().expect("Failed to get connection");

        let migrations = diesel_migrations::FileBasedMigrations::find_migrations_directory()
            .expect("Failed to find migrations directory");
        conn.run_pending_migrations(migrations)
            .expect("Failed to run migrations");

        Arc::new(pool)
    }
}
