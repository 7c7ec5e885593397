use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A prescribed literature text summary stored for offline study
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::novels)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Novel {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Title of the text
    title: String,

    /// Author of the text
    author: String,

    /// Study analysis, chapter notes, themes and so on
    analysis: String,

    /// When the analysis was saved
    created_at: NaiveDateTime,
}

impl Novel {
    pub fn new(title: String, author: String, analysis: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            author,
            analysis,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_author(&self) -> String {
        self.author.clone()
    }

    pub fn get_analysis(&self) -> String {
        self.analysis.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
