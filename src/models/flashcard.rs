use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{self, ReviewState};

/// Where a flashcard came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardSource {
    /// Authored by the student
    User,
    /// Produced by the generative-AI flashcard generator
    Ai,
}

impl FlashcardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashcardSource::User => "user",
            FlashcardSource::Ai => "ai",
        }
    }
}

/// A study flashcard with spaced-repetition scheduling state
///
/// Scheduling fields are only ever mutated through [`apply_review`], which
/// delegates the policy to the pure [`scheduler`] module. A card with no
/// `next_review` has never been reviewed and counts as due.
///
/// [`apply_review`]: Flashcard::apply_review
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::flashcards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Flashcard {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Subject id, e.g. "biology"
    subject: String,

    /// Topic within the subject
    topic: String,

    /// Front of the card (prompt)
    front: String,

    /// Back of the card (answer)
    back: String,

    /// "user" or "ai"
    source: String,

    /// When the card was created
    created_at: NaiveDateTime,

    /// Total number of reviews
    review_count: i32,

    /// Number of reviews answered correctly
    correct_count: i32,

    /// When the card was last reviewed
    last_reviewed: Option<NaiveDateTime>,

    /// Spaced-repetition ease factor, bounded [1.3, 3.0]
    ease_factor: f64,

    /// Current review interval in days, always >= 1
    interval_days: i32,

    /// Consecutive-correct streak
    streak: i32,

    /// round(100 * correct_count / review_count), 0 while unreviewed
    mastery: i32,

    /// When the card is next due; None means due now
    next_review: Option<NaiveDateTime>,
}

impl Flashcard {
    /// Creates a new card with default scheduling state
    pub fn new(
        subject: String,
        topic: String,
        front: String,
        back: String,
        source: FlashcardSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject,
            topic,
            front,
            back,
            source: source.as_str().to_string(),
            created_at: Utc::now().naive_utc(),
            review_count: 0,
            correct_count: 0,
            last_reviewed: None,
            ease_factor: scheduler::DEFAULT_EASE,
            interval_days: 1,
            streak: 0,
            mastery: 0,
            next_review: None,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }

    pub fn get_topic(&self) -> String {
        self.topic.clone()
    }

    pub fn get_front(&self) -> String {
        self.front.clone()
    }

    pub fn get_back(&self) -> String {
        self.back.clone()
    }

    pub fn get_source(&self) -> String {
        self.source.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_review_count(&self) -> i32 {
        self.review_count
    }

    pub fn get_correct_count(&self) -> i32 {
        self.correct_count
    }

    pub fn get_last_reviewed(&self) -> Option<DateTime<Utc>> {
        self.last_reviewed
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    }

    pub fn get_ease_factor(&self) -> f64 {
        self.ease_factor
    }

    pub fn get_interval_days(&self) -> i32 {
        self.interval_days
    }

    pub fn get_streak(&self) -> i32 {
        self.streak
    }

    pub fn get_mastery(&self) -> i32 {
        self.mastery
    }

    pub fn get_next_review(&self) -> Option<DateTime<Utc>> {
        self.next_review
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    }

    /// Whether the card is due for review at `now`
    ///
    /// A card with no scheduled next review has never been reviewed and is
    /// always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.get_next_review() {
            None => true,
            Some(next) => next <= now,
        }
    }

    /// The scheduling state consumed by the scheduler policy
    pub fn review_state(&self) -> ReviewState {
        ReviewState {
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            review_count: self.review_count,
            correct_count: self.correct_count,
            streak: self.streak,
        }
    }

    /// Applies one review outcome to the card's scheduling state
    ///
    /// Consumes exactly one review event: counts, ease, interval, streak,
    /// mastery, and both timestamps are updated in a single step.
    pub fn apply_review(
        &mut self,
        correct: bool,
        difficulty: scheduler::Difficulty,
        now: DateTime<Utc>,
    ) {
        let next = scheduler::apply_review(self.review_state(), correct, difficulty);

        self.ease_factor = next.ease_factor;
        self.interval_days = next.interval_days;
        self.review_count = next.review_count;
        self.correct_count = next.correct_count;
        self.streak = next.streak;
        self.mastery = scheduler::mastery(next.review_count, next.correct_count);
        self.last_reviewed = Some(now.naive_utc());
        self.next_review =
            Some((now + chrono::Duration::days(next.interval_days as i64)).naive_utc());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Difficulty;

    fn card() -> Flashcard {
        Flashcard::new(
            "biology".to_string(),
            "Photosynthesis".to_string(),
            "What gas do plants absorb?".to_string(),
            "Carbon dioxide".to_string(),
            FlashcardSource::User,
        )
    }

    #[test]
    fn test_new_card_defaults() {
        let card = card();

        assert!(Uuid::parse_str(&card.get_id()).is_ok());
        assert_eq!(card.get_ease_factor(), 2.5);
        assert_eq!(card.get_interval_days(), 1);
        assert_eq!(card.get_review_count(), 0);
        assert_eq!(card.get_mastery(), 0);
        assert_eq!(card.get_next_review(), None);
        assert_eq!(card.get_source(), "user");
    }

    #[test]
    fn test_new_card_is_due() {
        assert!(card().is_due(Utc::now()));
    }

    #[test]
    fn test_apply_review_schedules_next_review() {
        let mut card = card();
        let now = Utc::now();

        card.apply_review(true, Difficulty::Normal, now);

        // ease 2.5, interval 1 -> round(1 * 2.5) = 3 days out
        assert_eq!(card.get_interval_days(), 3);
        assert_eq!(card.get_review_count(), 1);
        assert_eq!(card.get_correct_count(), 1);
        assert_eq!(card.get_mastery(), 100);
        assert_eq!(card.get_last_reviewed(), Some(now));
        assert_eq!(card.get_next_review(), Some(now + chrono::Duration::days(3)));
        assert!(!card.is_due(now));
        assert!(card.is_due(now + chrono::Duration::days(3)));
    }

    #[test]
    fn test_apply_incorrect_review_resets() {
        let mut card = card();
        let now = Utc::now();

        card.apply_review(true, Difficulty::Normal, now);
        card.apply_review(false, Difficulty::Normal, now);

        assert_eq!(card.get_interval_days(), 1);
        assert_eq!(card.get_streak(), 0);
        assert_eq!(card.get_review_count(), 2);
        assert_eq!(card.get_mastery(), 50);
    }
}
