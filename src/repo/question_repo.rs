use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Question;
use crate::schema::questions;

/// Saves a batch of questions, refreshing rows that already exist
///
/// Questions are keyed by (subject, question text); a conflicting row has
/// its options, answer, and explanation replaced rather than being
/// duplicated. Rows failing validation are skipped.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `batch` - The questions to save
///
/// ### Returns
///
/// A Result containing the number of rows inserted or refreshed
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A database insert operation fails
#[instrument(skip(pool, batch), fields(batch_size = batch.len()))]
pub async fn save_questions(pool: &DbPool, batch: &[Question]) -> Result<usize> {
    let mut conn = pool.get()?;

    let mut saved = 0;
    for question in batch {
        if question.validate().is_err() {
            debug!("Skipping invalid question {}", question.get_id());
            continue;
        }

        saved += diesel::insert_into(questions::table)
            .values(question)
            .on_conflict((questions::subject, questions::question))
            .do_update()
            .set((
                questions::options.eq(question.get_options()),
                questions::answer.eq(question.get_answer()),
                questions::explanation.eq(question.get_explanation()),
            ))
            .execute_with_retry(&mut conn)
            .await?;
    }

    info!("Saved {} of {} questions", saved, batch.len());

    Ok(saved)
}

/// Gets a random sample of stored questions
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `subject` - The subject to sample from
/// * `count` - The maximum number of questions to return
/// * `topic` - An optional topic filter
/// * `year` - An optional exam-year filter
///
/// ### Returns
///
/// A Result containing up to `count` questions in random order
#[instrument(skip(pool))]
pub async fn get_questions(
    pool: &DbPool,
    subject: &str,
    count: usize,
    topic: Option<&str>,
    year: Option<&str>,
) -> Result<Vec<Question>> {
    let mut conn = pool.get()?;

    let mut query = questions::table
        .filter(questions::subject.eq(subject))
        .into_boxed();

    if let Some(topic) = topic {
        query = query.filter(questions::topic.eq(topic));
    }
    if let Some(year) = year {
        query = query.filter(questions::exam_year.eq(year));
    }

    let results = query
        .order(diesel::dsl::sql::<diesel::sql_types::Integer>("RANDOM()"))
        .limit(count as i64)
        .select(Question::as_select())
        .load::<Question>(&mut conn)?;

    debug!("Sampled {} questions for {}", results.len(), subject);

    Ok(results)
}

/// Counts the stored questions for one subject
pub async fn count_questions(pool: &DbPool, subject: &str) -> Result<i64> {
    let mut conn = pool.get()?;

    let count = questions::table
        .filter(questions::subject.eq(subject))
        .count()
        .get_result(&mut conn)?;

    Ok(count)
}

/// Counts stored questions grouped by subject
///
/// ### Returns
///
/// A Result containing (subject, count) pairs for every subject with at
/// least one question
pub async fn count_questions_by_subject(pool: &DbPool) -> Result<Vec<(String, i64)>> {
    let mut conn = pool.get()?;

    let counts = questions::table
        .group_by(questions::subject)
        .select((questions::subject, diesel::dsl::count_star()))
        .load::<(String, i64)>(&mut conn)?;

    Ok(counts)
}

/// Counts all stored questions
pub async fn count_all_questions(pool: &DbPool) -> Result<i64> {
    let mut conn = pool.get()?;

    let count = questions::table.count().get_result(&mut conn)?;

    Ok(count)
}
