use anyhow::Result;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Session;
use crate::schema::sessions;

/// Sessions returned by the listing, newest first
const SESSION_LIST_LIMIT: i64 = 50;

/// Records a finished practice or exam session
#[instrument(skip(pool, session), fields(session_id = %session.get_id()))]
pub async fn create_session(pool: &DbPool, session: &Session) -> Result<Session> {
    let mut conn = pool.get()?;

    diesel::insert_into(sessions::table)
        .values(session)
        .execute_with_retry(&mut conn)
        .await?;

    Ok(session.clone())
}

/// Gets recent sessions, newest first
pub async fn get_sessions(pool: &DbPool) -> Result<Vec<Session>> {
    let mut conn = pool.get()?;

    let stored = sessions::table
        .order(sessions::created_at.desc())
        .limit(SESSION_LIST_LIMIT)
        .select(Session::as_select())
        .load::<Session>(&mut conn)?;

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list_sessions() {
        let pool = setup_test_db();

        let session = Session::new(
            "practice".to_string(),
            json!(["physics"]),
            json!({"physics": {"correct": 7, "total": 10}}),
            7,
            3,
            70.0,
            600,
        );
        create_session(&pool, &session).await.unwrap();

        let listed = get_sessions(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].get_mode(), "practice");
        assert_eq!(listed[0].get_score(), 70.0);
        assert_eq!(listed[0].get_subjects(), json!(["physics"]));
    }
}
