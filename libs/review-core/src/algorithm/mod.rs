//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::error::Result;
use crate::types::{Quality, ReviewState};
use chrono::{DateTime, Utc};

/// Result of scheduling an item after review.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_state: ReviewState,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review state after a review.
    ///
    /// Must be pure: the same `(state, quality, now, time_taken)` always
    /// yields the same result, and `state` is never modified.
    fn schedule(
        &self,
        state: &ReviewState,
        quality: Quality,
        now: DateTime<Utc>,
        time_taken: Option<u32>,
    ) -> Result<SchedulingResult>;

    /// Initial state for an item first seen at `now`.
    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState;
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SpacedRepetitionAlgorithm>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
