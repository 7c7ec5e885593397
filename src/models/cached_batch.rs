use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::question::Question;

/// A persisted batch of questions keyed by the request that produced it
///
/// The cache key encodes subject, count, year and exam type, so two requests
/// only share a batch when they would have hit the upstream identically. The
/// question list itself is stored as a JSON array in a TEXT column.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::question_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CachedBatch {
    /// "{subject}-{count}-{year|all}-{exam_type}"
    cache_key: String,

    /// Subject id the batch belongs to
    subject: String,

    /// Exam year filter the batch was fetched with, if any
    exam_year: Option<String>,

    /// JSON array of questions
    questions: String,

    /// When the batch was fetched from upstream
    fetched_at: NaiveDateTime,
}

impl CachedBatch {
    /// Builds the cache key for a question request
    pub fn key(subject: &str, count: usize, year: Option<&str>, exam_type: &str) -> String {
        format!("{}-{}-{}-{}", subject, count, year.unwrap_or("all"), exam_type)
    }

    /// Creates a batch from a fetched question list
    ///
    /// Returns an error if the questions fail to serialize, which only
    /// happens for non-string keys and similar pathological values.
    pub fn new(
        cache_key: String,
        subject: String,
        exam_year: Option<String>,
        questions: &[Question],
    ) -> serde_json::Result<Self> {
        Ok(Self {
            cache_key,
            subject,
            exam_year,
            questions: serde_json::to_string(questions)?,
            fetched_at: Utc::now().naive_utc(),
        })
    }

    pub fn get_cache_key(&self) -> String {
        self.cache_key.clone()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }

    pub fn get_exam_year(&self) -> Option<String> {
        self.exam_year.clone()
    }

    pub fn get_fetched_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.fetched_at, Utc)
    }

    /// Deserializes the stored question list
    pub fn questions(&self) -> serde_json::Result<Vec<Question>> {
        serde_json::from_str(&self.questions)
    }

    /// Whether the batch was fetched within `max_age`
    pub fn is_fresh(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.get_fetched_at() < max_age
    }
}
