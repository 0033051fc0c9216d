//! Status classification.
//!
//! The learning bucket is derived from `(repetitions, ease_factor, interval)`
//! alone, so display layers and batch reports can classify a snapshot
//! without replaying the scheduler or reading the review history.

use crate::types::{ReviewState, ReviewStatus, INITIAL_EASE_FACTOR};

/// Minimum consecutive correct recalls before an item can be mastered.
pub const MASTERY_REPETITIONS: u32 = 5;

/// Ease factor an item must exceed to be mastered.
pub const MASTERY_EASE: f64 = INITIAL_EASE_FACTOR;

/// Interval in days an item must exceed to be mastered.
pub const MASTERY_INTERVAL: u32 = 30;

impl ReviewStatus {
    /// Classify a reviewed item. First matching rule wins.
    pub fn classify(repetitions: u32, ease_factor: f64, interval: u32) -> Self {
        if repetitions == 0 {
            Self::Learning
        } else if repetitions < MASTERY_REPETITIONS {
            Self::Review
        } else if ease_factor > MASTERY_EASE && interval > MASTERY_INTERVAL {
            Self::Mastered
        } else {
            Self::Review
        }
    }
}

impl ReviewState {
    /// Classify this snapshot. A state that has never been reviewed is `New`.
    pub fn classify(&self) -> ReviewStatus {
        if self.last_review_date.is_none() {
            ReviewStatus::New
        } else {
            ReviewStatus::classify(self.repetitions, self.ease_factor, self.interval)
        }
    }
}
