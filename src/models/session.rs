use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::json_value::JsonValue;

/// A completed practice or exam attempt
///
/// `subjects` is a JSON array of subject ids, `breakdown` a JSON object
/// mapping subject id to per-subject correct/total counts. Both are stored
/// as TEXT and round-tripped through [`JsonValue`].
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// "practice" or "exam"
    mode: String,

    /// JSON array of subject ids taken in this session
    subjects: JsonValue,

    /// JSON object of per-subject results
    breakdown: JsonValue,

    /// Questions answered correctly
    correct_count: i32,

    /// Questions answered incorrectly
    wrong_count: i32,

    /// Overall score as a percentage
    score: f64,

    /// Time spent, in seconds
    duration_secs: i32,

    /// When the session finished
    created_at: NaiveDateTime,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: String,
        subjects: serde_json::Value,
        breakdown: serde_json::Value,
        correct_count: i32,
        wrong_count: i32,
        score: f64,
        duration_secs: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            mode,
            subjects: JsonValue(subjects),
            breakdown: JsonValue(breakdown),
            correct_count,
            wrong_count,
            score,
            duration_secs,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_mode(&self) -> String {
        self.mode.clone()
    }

    pub fn get_subjects(&self) -> serde_json::Value {
        self.subjects.0.clone()
    }

    pub fn get_breakdown(&self) -> serde_json::Value {
        self.breakdown.0.clone()
    }

    pub fn get_correct_count(&self) -> i32 {
        self.correct_count
    }

    pub fn get_wrong_count(&self) -> i32 {
        self.wrong_count
    }

    pub fn get_score(&self) -> f64 {
        self.score
    }

    pub fn get_duration_secs(&self) -> i32 {
        self.duration_secs
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
