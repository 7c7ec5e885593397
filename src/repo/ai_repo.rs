use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::clients::ChatMessage;
use crate::db::{DbPool, ExecuteWithRetry};
use crate::schema::{ai_cache, ai_history, ai_settings};

/// Row key for the single settings record
const SETTINGS_ID: &str = "current_settings";

/// Row key for the single conversation record
const HISTORY_ID: &str = "main_conversation";

/// How long a cached AI response stays valid
pub const AI_CACHE_MAX_AGE_DAYS: i64 = 7;

/// Most recent conversation turns kept in history
pub const HISTORY_CAP: usize = 50;

/// Gets the stored provider and model selection, if any
pub async fn get_ai_settings(pool: &DbPool) -> Result<Option<(String, String)>> {
    let mut conn = pool.get()?;

    let settings = ai_settings::table
        .find(SETTINGS_ID)
        .select((ai_settings::provider, ai_settings::model))
        .first::<(String, String)>(&mut conn)
        .optional()?;

    Ok(settings)
}

/// Stores the provider and model selection
#[instrument(skip(pool))]
pub async fn save_ai_settings(pool: &DbPool, provider: &str, model: &str) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::insert_into(ai_settings::table)
        .values((
            ai_settings::id.eq(SETTINGS_ID),
            ai_settings::provider.eq(provider),
            ai_settings::model.eq(model),
            ai_settings::updated_at.eq(Utc::now().naive_utc()),
        ))
        .on_conflict(ai_settings::id)
        .do_update()
        .set((
            ai_settings::provider.eq(provider),
            ai_settings::model.eq(model),
            ai_settings::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Gets a cached AI response that is still within its validity window
///
/// Expired entries count as misses. As with the question cache, `Ok(None)`
/// is a miss and `Err` is a broken cache.
#[instrument(skip(pool))]
pub async fn get_cached_ai_response(
    pool: &DbPool,
    key: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let mut conn = pool.get()?;

    let cutoff = (now - Duration::days(AI_CACHE_MAX_AGE_DAYS)).naive_utc();

    let response = ai_cache::table
        .find(key)
        .filter(ai_cache::created_at.gt(cutoff))
        .select(ai_cache::response)
        .first::<String>(&mut conn)
        .optional()?;

    debug!(
        "AI cache {} for {}",
        if response.is_some() { "hit" } else { "miss" },
        key
    );

    Ok(response)
}

/// Stores an AI response under its cache key
#[instrument(skip(pool, response))]
pub async fn cache_ai_response(pool: &DbPool, key: &str, response: &str) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::insert_into(ai_cache::table)
        .values((
            ai_cache::cache_key.eq(key),
            ai_cache::response.eq(response),
            ai_cache::created_at.eq(Utc::now().naive_utc()),
        ))
        .on_conflict(ai_cache::cache_key)
        .do_update()
        .set((
            ai_cache::response.eq(response),
            ai_cache::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Loads the stored conversation, empty if none exists
pub async fn load_history(pool: &DbPool) -> Result<Vec<ChatMessage>> {
    let mut conn = pool.get()?;

    let stored = ai_history::table
        .find(HISTORY_ID)
        .select(ai_history::messages)
        .first::<String>(&mut conn)
        .optional()?;

    match stored {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Stores the conversation, keeping only the most recent turns
#[instrument(skip(pool, messages), fields(message_count = messages.len()))]
pub async fn save_history(pool: &DbPool, messages: &[ChatMessage]) -> Result<()> {
    let mut conn = pool.get()?;

    let capped = if messages.len() > HISTORY_CAP {
        &messages[messages.len() - HISTORY_CAP..]
    } else {
        messages
    };
    let raw = serde_json::to_string(capped)?;

    diesel::insert_into(ai_history::table)
        .values((
            ai_history::id.eq(HISTORY_ID),
            ai_history::messages.eq(raw.clone()),
            ai_history::updated_at.eq(Utc::now().naive_utc()),
        ))
        .on_conflict(ai_history::id)
        .do_update()
        .set((
            ai_history::messages.eq(raw),
            ai_history::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Deletes the stored conversation
pub async fn clear_history(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::delete(ai_history::table.find(HISTORY_ID.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;

    #[tokio::test]
    async fn test_settings_default_to_none() {
        let pool = setup_test_db();

        assert_eq!(get_ai_settings(&pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_settings_upsert() {
        let pool = setup_test_db();

        save_ai_settings(&pool, "gemini", "gemini-1.5-flash").await.unwrap();
        save_ai_settings(&pool, "cerebras", "llama-3.3-70b").await.unwrap();

        assert_eq!(
            get_ai_settings(&pool).await.unwrap(),
            Some(("cerebras".to_string(), "llama-3.3-70b".to_string()))
        );
    }

    #[tokio::test]
    async fn test_response_cache_round_trip() {
        let pool = setup_test_db();
        let now = Utc::now();

        assert_eq!(get_cached_ai_response(&pool, "key", now).await.unwrap(), None);

        cache_ai_response(&pool, "key", "the answer").await.unwrap();

        assert_eq!(
            get_cached_ai_response(&pool, "key", now).await.unwrap(),
            Some("the answer".to_string())
        );
    }

    #[tokio::test]
    async fn test_response_cache_expires() {
        let pool = setup_test_db();

        cache_ai_response(&pool, "key", "stale").await.unwrap();

        let future = Utc::now() + Duration::days(AI_CACHE_MAX_AGE_DAYS + 1);
        assert_eq!(get_cached_ai_response(&pool, "key", future).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_history_round_trip_and_cap() {
        let pool = setup_test_db();

        assert!(load_history(&pool).await.unwrap().is_empty());

        let messages: Vec<ChatMessage> = (0..60)
            .map(|i| ChatMessage::user(format!("message {}", i)))
            .collect();
        save_history(&pool, &messages).await.unwrap();

        let loaded = load_history(&pool).await.unwrap();
        assert_eq!(loaded.len(), HISTORY_CAP);
        assert_eq!(loaded[0].content, "message 10"); // oldest turns dropped
        assert_eq!(loaded.last().unwrap().content, "message 59");
    }

    #[tokio::test]
    async fn test_clear_history() {
        let pool = setup_test_db();

        save_history(&pool, &[ChatMessage::user("hello")]).await.unwrap();
        clear_history(&pool).await.unwrap();

        assert!(load_history(&pool).await.unwrap().is_empty());
    }
}
