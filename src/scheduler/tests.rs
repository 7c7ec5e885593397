use proptest::prelude::*;

use super::*;

fn fresh() -> ReviewState {
    ReviewState {
        ease_factor: DEFAULT_EASE,
        interval_days: 1,
        review_count: 0,
        correct_count: 0,
        streak: 0,
    }
}

#[test]
fn test_correct_normal_grows_by_ease() {
    let next = apply_review(fresh(), true, Difficulty::Normal);

    // round(1 * 2.5)
    assert_eq!(next.interval_days, 3);
    assert_eq!(next.ease_factor, DEFAULT_EASE);
    assert_eq!(next.streak, 1);
    assert_eq!(next.review_count, 1);
    assert_eq!(next.correct_count, 1);
}

#[test]
fn test_correct_easy_raises_ease_and_grows_faster() {
    let next = apply_review(fresh(), true, Difficulty::Easy);

    assert_eq!(next.ease_factor, 2.65);
    // round(1 * 2.65 * 1.3)
    assert_eq!(next.interval_days, 3);

    let again = apply_review(next, true, Difficulty::Easy);

    assert_eq!(again.ease_factor, 2.8);
    // round(3 * 2.8 * 1.3)
    assert_eq!(again.interval_days, 11);
}

#[test]
fn test_ease_capped_at_max() {
    let mut state = fresh();

    for _ in 0..10 {
        state = apply_review(state, true, Difficulty::Easy);
    }

    assert_eq!(state.ease_factor, MAX_EASE);
}

#[test]
fn test_correct_hard_lowers_ease_but_still_grows() {
    let state = ReviewState {
        interval_days: 10,
        ..fresh()
    };
    let next = apply_review(state, true, Difficulty::Hard);

    assert_eq!(next.ease_factor, 2.3);
    // round(10 * 1.2)
    assert_eq!(next.interval_days, 12);
    assert_eq!(next.streak, 1);
}

#[test]
fn test_ease_floored_at_min() {
    let mut state = fresh();

    for _ in 0..10 {
        state = apply_review(state, false, Difficulty::Normal);
    }

    assert_eq!(state.ease_factor, MIN_EASE);
}

#[test]
fn test_incorrect_resets_interval_and_streak() {
    let state = ReviewState {
        interval_days: 30,
        streak: 7,
        review_count: 7,
        correct_count: 7,
        ..fresh()
    };
    let next = apply_review(state, false, Difficulty::Easy);

    assert_eq!(next.interval_days, 1);
    assert_eq!(next.streak, 0);
    assert_eq!(next.ease_factor, 2.3);
    assert_eq!(next.review_count, 8);
    assert_eq!(next.correct_count, 7);
}

#[test]
fn test_interval_never_below_one_day() {
    // a minimal-ease hard answer on a one-day interval rounds to one
    let state = ReviewState {
        ease_factor: MIN_EASE,
        ..fresh()
    };
    let next = apply_review(state, true, Difficulty::Hard);

    assert_eq!(next.interval_days, 1);
}

#[test]
fn test_mastery_rounds() {
    assert_eq!(mastery(0, 0), 0);
    assert_eq!(mastery(1, 1), 100);
    assert_eq!(mastery(2, 1), 50);
    assert_eq!(mastery(3, 1), 33);
    assert_eq!(mastery(3, 2), 67);
}

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Normal),
        Just(Difficulty::Hard),
    ]
}

fn arb_state() -> impl Strategy<Value = ReviewState> {
    (
        1.3f64..=3.0,
        1i32..=3650,
        0i32..=10_000,
        0i32..=10_000,
        0i32..=10_000,
    )
        .prop_map(
            |(ease_factor, interval_days, review_count, correct_count, streak)| ReviewState {
                ease_factor,
                interval_days,
                review_count: review_count.max(correct_count),
                correct_count,
                streak,
            },
        )
}

proptest! {
    #[test]
    fn test_review_preserves_bounds(
        state in arb_state(),
        correct in any::<bool>(),
        difficulty in arb_difficulty(),
    ) {
        let next = apply_review(state, correct, difficulty);

        prop_assert!(next.ease_factor >= MIN_EASE);
        prop_assert!(next.ease_factor <= MAX_EASE);
        prop_assert!(next.interval_days >= 1);
        prop_assert_eq!(next.review_count, state.review_count + 1);
        prop_assert!(next.correct_count <= next.review_count.max(state.correct_count + 1));

        let m = mastery(next.review_count, next.correct_count);
        prop_assert!((0..=100).contains(&m));
    }

    #[test]
    fn test_correct_never_shrinks_interval(
        state in arb_state(),
        difficulty in arb_difficulty(),
    ) {
        let next = apply_review(state, true, difficulty);

        prop_assert!(next.interval_days >= state.interval_days);
        prop_assert_eq!(next.streak, state.streak + 1);
    }

    #[test]
    fn test_incorrect_always_resets(state in arb_state()) {
        let next = apply_review(state, false, Difficulty::Normal);

        prop_assert_eq!(next.interval_days, 1);
        prop_assert_eq!(next.streak, 0);
        prop_assert_eq!(next.correct_count, state.correct_count);
    }
}
