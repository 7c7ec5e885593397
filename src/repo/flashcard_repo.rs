use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Flashcard;
use crate::schema::flashcards;

/// Creates a flashcard
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `card` - The flashcard to store
///
/// ### Returns
///
/// A Result containing the stored flashcard
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database insert operation fails
#[instrument(skip(pool, card), fields(card_id = %card.get_id()))]
pub async fn create_flashcard(pool: &DbPool, card: &Flashcard) -> Result<Flashcard> {
    let mut conn = pool.get()?;

    diesel::insert_into(flashcards::table)
        .values(card)
        .execute_with_retry(&mut conn)
        .await?;

    debug!("Created flashcard {}", card.get_id());

    Ok(card.clone())
}

/// Creates a batch of flashcards
///
/// Used by AI generation, which produces several cards at once.
#[instrument(skip(pool, cards), fields(batch_size = cards.len()))]
pub async fn create_flashcards(pool: &DbPool, cards: &[Flashcard]) -> Result<usize> {
    let mut conn = pool.get()?;

    let mut created = 0;
    for card in cards {
        created += diesel::insert_into(flashcards::table)
            .values(card)
            .execute_with_retry(&mut conn)
            .await?;
    }

    info!("Created {} flashcards", created);

    Ok(created)
}

/// Gets flashcards, optionally filtered by subject and topic
///
/// Cards come back newest first.
#[instrument(skip(pool))]
pub async fn get_flashcards(
    pool: &DbPool,
    subject: Option<&str>,
    topic: Option<&str>,
) -> Result<Vec<Flashcard>> {
    let mut conn = pool.get()?;

    let mut query = flashcards::table.into_boxed();

    if let Some(subject) = subject {
        query = query.filter(flashcards::subject.eq(subject));
    }
    if let Some(topic) = topic {
        query = query.filter(flashcards::topic.eq(topic));
    }

    let cards = query
        .order(flashcards::created_at.desc())
        .select(Flashcard::as_select())
        .load::<Flashcard>(&mut conn)?;

    Ok(cards)
}

/// Gets a flashcard by id
///
/// ### Returns
///
/// A Result containing the flashcard if found, or None if it does not exist
pub async fn get_flashcard(pool: &DbPool, id: &str) -> Result<Option<Flashcard>> {
    let mut conn = pool.get()?;

    let card = flashcards::table
        .find(id)
        .select(Flashcard::as_select())
        .first::<Flashcard>(&mut conn)
        .optional()?;

    Ok(card)
}

/// Gets the cards due for review at `now`, weakest first
///
/// A card is due when it has never been reviewed or its scheduled next
/// review is in the past. Ordering ascending by mastery puts the cards the
/// student struggles with at the front of the queue.
#[instrument(skip(pool))]
pub async fn get_due_flashcards(pool: &DbPool, now: DateTime<Utc>) -> Result<Vec<Flashcard>> {
    let mut conn = pool.get()?;

    let cards = flashcards::table
        .filter(
            flashcards::next_review
                .is_null()
                .or(flashcards::next_review.le(now.naive_utc())),
        )
        .order(flashcards::mastery.asc())
        .select(Flashcard::as_select())
        .load::<Flashcard>(&mut conn)?;

    debug!("{} flashcards due", cards.len());

    Ok(cards)
}

/// Writes back a card's scheduling state after a review
#[instrument(skip(pool, card), fields(card_id = %card.get_id()))]
pub async fn update_flashcard_review(pool: &DbPool, card: &Flashcard) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::update(flashcards::table.find(card.get_id()))
        .set((
            flashcards::review_count.eq(card.get_review_count()),
            flashcards::correct_count.eq(card.get_correct_count()),
            flashcards::last_reviewed.eq(card.get_last_reviewed().map(|dt| dt.naive_utc())),
            flashcards::ease_factor.eq(card.get_ease_factor()),
            flashcards::interval_days.eq(card.get_interval_days()),
            flashcards::streak.eq(card.get_streak()),
            flashcards::mastery.eq(card.get_mastery()),
            flashcards::next_review.eq(card.get_next_review().map(|dt| dt.naive_utc())),
        ))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

/// Deletes a flashcard
///
/// ### Returns
///
/// A Result containing true if a card was deleted, false if none matched
#[instrument(skip(pool))]
pub async fn delete_flashcard(pool: &DbPool, id: &str) -> Result<bool> {
    let mut conn = pool.get()?;

    let deleted = diesel::delete(flashcards::table.find(id.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(deleted > 0)
}
