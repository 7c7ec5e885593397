use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::CachedBatch;
use crate::schema::question_cache;

/// Gets a cached question batch by key
///
/// A missing batch is an ordinary miss (`Ok(None)`); only an actual
/// database failure is an error, so callers can tell "not cached" from
/// "cache broken" and fall through accordingly.
#[instrument(skip(pool))]
pub async fn get_cached_batch(pool: &DbPool, key: &str) -> Result<Option<CachedBatch>> {
    let mut conn = pool.get()?;

    let batch = question_cache::table
        .find(key)
        .select(CachedBatch::as_select())
        .first::<CachedBatch>(&mut conn)
        .optional()?;

    debug!("Cache {} for {}", if batch.is_some() { "hit" } else { "miss" }, key);

    Ok(batch)
}

/// Stores a question batch, replacing any batch under the same key
#[instrument(skip(pool, batch), fields(cache_key = %batch.get_cache_key()))]
pub async fn put_cached_batch(pool: &DbPool, batch: &CachedBatch) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::insert_into(question_cache::table)
        .values(batch)
        .on_conflict(question_cache::cache_key)
        .do_update()
        .set((
            question_cache::questions.eq(diesel::upsert::excluded(question_cache::questions)),
            question_cache::fetched_at.eq(diesel::upsert::excluded(question_cache::fetched_at)),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::repo::tests::setup_test_db;
    use serde_json::json;

    fn batch(key: &str, text: &str) -> CachedBatch {
        let questions = vec![Question::new(
            None,
            "physics".to_string(),
            None,
            text.to_string(),
            json!({"a": "one", "b": "two"}),
            "a".to_string(),
            None,
            "utme".to_string(),
            None,
            None,
            false,
        )];
        CachedBatch::new(key.to_string(), "physics".to_string(), None, &questions).unwrap()
    }

    #[tokio::test]
    async fn test_miss_is_ok_none() {
        let pool = setup_test_db();

        let result = get_cached_batch(&pool, "physics-20-all-utme").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let pool = setup_test_db();

        let stored = batch("physics-20-all-utme", "What is work?");
        put_cached_batch(&pool, &stored).await.unwrap();

        let fetched = get_cached_batch(&pool, "physics-20-all-utme")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.questions().unwrap().len(), 1);
        assert_eq!(fetched.get_subject(), "physics");
    }

    #[tokio::test]
    async fn test_put_replaces_same_key() {
        let pool = setup_test_db();

        put_cached_batch(&pool, &batch("physics-20-all-utme", "Old question?"))
            .await
            .unwrap();
        put_cached_batch(&pool, &batch("physics-20-all-utme", "New question?"))
            .await
            .unwrap();

        let fetched = get_cached_batch(&pool, "physics-20-all-utme")
            .await
            .unwrap()
            .unwrap();
        let questions = fetched.questions().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].get_question(), "New question?");
    }
}
