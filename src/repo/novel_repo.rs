use anyhow::Result;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Novel;
use crate::schema::novels;

/// Stores a novel analysis
#[instrument(skip(pool, novel), fields(novel_id = %novel.get_id()))]
pub async fn create_novel(pool: &DbPool, novel: &Novel) -> Result<Novel> {
    let mut conn = pool.get()?;

    diesel::insert_into(novels::table)
        .values(novel)
        .execute_with_retry(&mut conn)
        .await?;

    Ok(novel.clone())
}

/// Gets all stored novel analyses, newest first
pub async fn get_novels(pool: &DbPool) -> Result<Vec<Novel>> {
    let mut conn = pool.get()?;

    let stored = novels::table
        .order(novels::created_at.desc())
        .select(Novel::as_select())
        .load::<Novel>(&mut conn)?;

    Ok(stored)
}

/// Gets a novel analysis by id
pub async fn get_novel(pool: &DbPool, id: &str) -> Result<Option<Novel>> {
    let mut conn = pool.get()?;

    let novel = novels::table
        .find(id)
        .select(Novel::as_select())
        .first::<Novel>(&mut conn)
        .optional()?;

    Ok(novel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;

    #[tokio::test]
    async fn test_create_and_get_novel() {
        let pool = setup_test_db();

        let novel = Novel::new(
            "The Lekki Headmaster".to_string(),
            "Kabir Alabi Garba".to_string(),
            "A study analysis.".to_string(),
        );
        create_novel(&pool, &novel).await.unwrap();

        let fetched = get_novel(&pool, &novel.get_id()).await.unwrap();
        assert_eq!(fetched, Some(novel));

        assert_eq!(get_novel(&pool, "missing").await.unwrap(), None);
        assert_eq!(get_novels(&pool).await.unwrap().len(), 1);
    }
}
