use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// A single exam question
///
/// Questions arrive from three places: the external question bank, the
/// generative-AI fallback, and the fixed literary supplement. Whatever the
/// origin, a question always carries a non-empty subject and text, a labelled
/// option map (`a`–`e`), and exactly one answer label drawn from the labels
/// present in that map. The pair `(subject, question)` is unique in the
/// database; re-saving an existing pair updates options, answer, and
/// explanation instead of duplicating the row.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::questions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Question {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Identifier assigned by the external question bank, if any
    external_id: Option<String>,

    /// Subject id, e.g. "physics"
    subject: String,

    /// Topic or section within the subject
    topic: Option<String>,

    /// The question text
    question: String,

    /// Labelled options as a JSON object, keys "a" through "e"
    options: JsonValue,

    /// The correct option label (lowercase)
    answer: String,

    /// Worked explanation of the answer, if available
    explanation: Option<String>,

    /// Exam type the question was set for, e.g. "utme"
    exam_type: String,

    /// Exam year as a string, e.g. "2019"
    exam_year: Option<String>,

    /// URL of an accompanying diagram or image
    image_url: Option<String>,

    /// Whether the question was produced by the AI fallback
    is_ai_generated: bool,

    /// When this question was first saved locally
    created_at: NaiveDateTime,
}

impl Question {
    /// Creates a new question
    ///
    /// The answer label is lowercased; empty option values are dropped from
    /// the option map.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        external_id: Option<String>,
        subject: String,
        topic: Option<String>,
        question: String,
        options: serde_json::Value,
        answer: String,
        explanation: Option<String>,
        exam_type: String,
        exam_year: Option<String>,
        image_url: Option<String>,
        is_ai_generated: bool,
    ) -> Self {
        let options = prune_empty_options(options);
        Self {
            id: Uuid::new_v4().to_string(),
            external_id,
            subject,
            topic,
            question,
            options: JsonValue(options),
            answer: answer.to_lowercase(),
            explanation,
            exam_type,
            exam_year,
            image_url,
            is_ai_generated,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Creates a question with a caller-chosen id
    ///
    /// Used by the literary supplement, whose entries need stable ids so
    /// repeated exam constructions deduplicate against each other.
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_id(
        id: String,
        subject: String,
        topic: Option<String>,
        question: String,
        options: serde_json::Value,
        answer: String,
        explanation: Option<String>,
        exam_type: String,
        exam_year: Option<String>,
    ) -> Self {
        Self {
            id,
            external_id: None,
            subject,
            topic,
            question,
            options: JsonValue(prune_empty_options(options)),
            answer: answer.to_lowercase(),
            explanation,
            exam_type,
            exam_year,
            image_url: None,
            is_ai_generated: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_external_id(&self) -> Option<String> {
        self.external_id.clone()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }

    pub fn get_topic(&self) -> Option<String> {
        self.topic.clone()
    }

    pub fn get_question(&self) -> String {
        self.question.clone()
    }

    pub fn get_options(&self) -> JsonValue {
        self.options.clone()
    }

    /// Gets the option labels present in the option map, sorted
    pub fn get_option_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .options
            .0
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        labels.sort();
        labels
    }

    pub fn get_answer(&self) -> String {
        self.answer.clone()
    }

    pub fn get_explanation(&self) -> Option<String> {
        self.explanation.clone()
    }

    pub fn get_exam_type(&self) -> String {
        self.exam_type.clone()
    }

    pub fn get_exam_year(&self) -> Option<String> {
        self.exam_year.clone()
    }

    pub fn get_image_url(&self) -> Option<String> {
        self.image_url.clone()
    }

    pub fn is_ai_generated(&self) -> bool {
        self.is_ai_generated
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Stable identity for merging questions from different sources
    ///
    /// Every normalization of an upstream question mints a fresh row id, so
    /// the row id cannot recognize the same question arriving twice. The
    /// upstream id wins when present; otherwise the unique
    /// (subject, question) pair stands in.
    pub fn dedup_key(&self) -> String {
        match &self.external_id {
            Some(external_id) => format!("ext-{}", external_id),
            None => format!("{}|{}", self.subject, self.question),
        }
    }

    /// Validates the structural invariants of a question
    ///
    /// ### Errors
    ///
    /// Returns an error if the subject or question text is empty, the option
    /// map has fewer than 2 or more than 5 entries, or the answer label is
    /// not one of the present option labels.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.subject.trim().is_empty() {
            anyhow::bail!("Question has an empty subject");
        }
        if self.question.trim().is_empty() {
            anyhow::bail!("Question has empty text");
        }
        let labels = self.get_option_labels();
        if labels.len() < 2 || labels.len() > 5 {
            anyhow::bail!("Question must have between 2 and 5 options, got {}", labels.len());
        }
        if !labels.contains(&self.answer) {
            anyhow::bail!("Answer label {:?} is not among the options {:?}", self.answer, labels);
        }
        Ok(())
    }
}

/// Drops options whose value is null or an empty string
///
/// The question bank pads missing options with empty strings; keeping those
/// would break the 2–5 option invariant for genuine 4-option questions.
fn prune_empty_options(options: serde_json::Value) -> serde_json::Value {
    match options {
        serde_json::Value::Object(map) => {
            let pruned: serde_json::Map<String, serde_json::Value> = map
                .into_iter()
                .filter(|(_, v)| match v {
                    serde_json::Value::Null => false,
                    serde_json::Value::String(s) => !s.trim().is_empty(),
                    _ => true,
                })
                .collect();
            serde_json::Value::Object(pruned)
        }
        other => other,
    }
}
