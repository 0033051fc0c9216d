//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2. Quality grades run 0-5; anything below 3 is a
//! lapse and restarts the repetition sequence.
//!
//! The next interval is computed from the ease factor *before* this review
//! updates it. The ease factor is updated and clamped afterwards.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::error::{Result, SchedulerError};
use crate::types::{
    Quality, ReviewEvent, ReviewState, ReviewStatus, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
};
use chrono::{DateTime, Duration, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Upper bound on the interval in days.
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE_FACTOR,
            minimum_ease: MIN_EASE_FACTOR,
            maximum_interval: 36500,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState {
        ReviewState {
            ease_factor: self.initial_ease,
            ..ReviewState::new(now)
        }
    }

    fn schedule(
        &self,
        state: &ReviewState,
        quality: Quality,
        now: DateTime<Utc>,
        time_taken: Option<u32>,
    ) -> Result<SchedulingResult> {
        self.validate(state)?;

        let (interval, repetitions) = if quality.is_correct() {
            let interval = match state.repetitions {
                0 => 1,
                1 => 6,
                _ => self.grow_interval(state.interval, state.ease_factor),
            };
            (interval, state.repetitions.saturating_add(1))
        } else {
            (1, 0)
        };

        let ease_factor =
            (state.ease_factor + Self::ease_delta(quality)).max(self.minimum_ease);

        let next_due = now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut review_history = state.review_history.clone();
        review_history.push(ReviewEvent {
            date: now,
            quality,
            time_taken,
        });

        let new_state = ReviewState {
            ease_factor,
            interval,
            repetitions,
            next_review_date: next_due,
            last_review_date: Some(now),
            status: ReviewStatus::classify(repetitions, ease_factor, interval),
            total_reviews: state.total_reviews.saturating_add(1),
            correct_count: if quality.is_correct() {
                state.correct_count.saturating_add(1)
            } else {
                state.correct_count
            },
            review_history,
        };

        Ok(SchedulingResult { new_state })
    }
}

impl Sm2 {
    /// Validate the raw grade, then schedule.
    pub fn apply(
        &self,
        state: &ReviewState,
        quality: i64,
        now: DateTime<Utc>,
        time_taken: Option<u32>,
    ) -> Result<SchedulingResult> {
        let quality = Quality::new(quality)?;
        self.schedule(state, quality, now, time_taken)
    }

    /// Ease adjustment for a grade: `0.1 - (5-q) * (0.08 + (5-q) * 0.02)`.
    pub fn ease_delta(quality: Quality) -> f64 {
        let miss = f64::from(Quality::MAX - quality.value());
        0.1 - miss * (0.08 + miss * 0.02)
    }

    fn grow_interval(&self, interval: u32, ease_factor: f64) -> u32 {
        // f64::round rounds half away from zero.
        let grown = (f64::from(interval) * ease_factor).round();
        grown.clamp(1.0, f64::from(self.maximum_interval.max(1))) as u32
    }

    fn validate(&self, state: &ReviewState) -> Result<()> {
        // Written as a negated >= so NaN is rejected too.
        if !(state.ease_factor >= self.minimum_ease) {
            return Err(SchedulerError::InvalidState {
                field: "ease_factor",
                value: state.ease_factor,
            });
        }
        if state.interval < 1 {
            return Err(SchedulerError::InvalidState {
                field: "interval",
                value: f64::from(state.interval),
            });
        }
        Ok(())
    }
}
