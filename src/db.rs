use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use std::time::Duration;
use tracing::warn;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder().build(manager).expect("Failed to create pool.")
}

/// Maximum attempts for a single write statement before giving up
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Extension trait that retries SQLite writes which fail with
/// "database is locked"
///
/// SQLite allows only one writer at a time; under concurrent handlers a write
/// can transiently fail while another connection holds the write lock. Reads
/// are unaffected and are not wrapped.
pub trait ExecuteWithRetry: Sized {
    /// Executes the statement, retrying with exponential backoff while the
    /// database is locked
    fn execute_with_retry(
        self,
        conn: &mut SqliteConnection,
    ) -> impl std::future::Future<Output = anyhow::Result<usize>>;
}

impl<T> ExecuteWithRetry for T
where
    T: diesel::query_dsl::methods::ExecuteDsl<SqliteConnection> + Clone,
{
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> anyhow::Result<usize> {
        let mut delay = Duration::from_millis(50);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            match diesel::query_dsl::methods::ExecuteDsl::execute(self.clone(), conn) {
                Ok(rows) => return Ok(rows),
                Err(DieselError::DatabaseError(_, ref info))
                    if info.message().contains("database is locked")
                        && attempt < MAX_WRITE_ATTEMPTS =>
                {
                    warn!("Database locked, retrying write (attempt {})", attempt);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e.into()),
            }
        }

        unreachable!("the final attempt either returns Ok or the error")
    }
}
