//! Spaced-repetition scheduling policy for flashcards.
//!
//! The policy is a simplified SM-2 variant: each card carries an ease factor
//! and an interval in days, and every review either grows the interval
//! (correct) or resets it to one day (incorrect). Self-rated difficulty
//! shades how fast the interval grows on a correct answer.
//!
//! All functions here are pure. The [`Flashcard`] model owns applying the
//! resulting state and stamping timestamps.
//!
//! [`Flashcard`]: crate::models::Flashcard

use serde::{Deserialize, Serialize};

/// Ease factor assigned to a brand-new card
pub const DEFAULT_EASE: f64 = 2.5;

/// Lower bound on the ease factor
pub const MIN_EASE: f64 = 1.3;

/// Upper bound on the ease factor
pub const MAX_EASE: f64 = 3.0;

/// Self-rated difficulty of a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// The answer came instantly
    Easy,
    /// The answer took some thought
    #[default]
    Normal,
    /// The answer was barely recalled
    Hard,
}

/// The scheduling state of one card, detached from its content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub review_count: i32,
    pub correct_count: i32,
    pub streak: i32,
}

/// Computes the state after one review
///
/// On a correct answer the interval grows by a difficulty-dependent factor
/// and the streak extends; easy answers also raise the ease factor while
/// hard ones lower it. An incorrect answer lowers the ease factor, resets
/// the interval to one day, and breaks the streak. `difficulty` is ignored
/// for incorrect answers.
///
/// The resulting ease factor always lies in [[`MIN_EASE`], [`MAX_EASE`]]
/// and the resulting interval is at least one day.
pub fn apply_review(state: ReviewState, correct: bool, difficulty: Difficulty) -> ReviewState {
    let mut ease = state.ease_factor;
    let interval;
    let streak;

    if correct {
        match difficulty {
            Difficulty::Easy => {
                ease = (ease + 0.15).min(MAX_EASE);
                interval = round_interval(state.interval_days as f64 * ease * 1.3);
            }
            Difficulty::Normal => {
                interval = round_interval(state.interval_days as f64 * ease);
            }
            Difficulty::Hard => {
                ease = (ease - 0.2).max(MIN_EASE);
                interval = round_interval(state.interval_days as f64 * 1.2);
            }
        }
        streak = state.streak + 1;
    } else {
        ease = (ease - 0.2).max(MIN_EASE);
        interval = 1;
        streak = 0;
    }

    ReviewState {
        ease_factor: ease,
        interval_days: interval,
        review_count: state.review_count + 1,
        correct_count: state.correct_count + if correct { 1 } else { 0 },
        streak,
    }
}

/// Mastery percentage, rounded to the nearest whole number
///
/// Zero while the card has never been reviewed.
pub fn mastery(review_count: i32, correct_count: i32) -> i32 {
    if review_count <= 0 {
        return 0;
    }

    (100.0 * correct_count as f64 / review_count as f64).round() as i32
}

/// Rounds a computed interval and clamps it to at least one day
fn round_interval(days: f64) -> i32 {
    (days.round() as i32).max(1)
}

#[cfg(test)]
mod tests;
