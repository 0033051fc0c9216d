//! Aggregate statistics over a learner's review states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::queue::{due_count, next_due_date};
use crate::types::{ReviewState, ReviewStatus};

/// Per-status item counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub mastered: usize,
}

impl StatusCounts {
    fn add(&mut self, status: ReviewStatus) {
        match status {
            ReviewStatus::New => self.new += 1,
            ReviewStatus::Learning => self.learning += 1,
            ReviewStatus::Review => self.review += 1,
            ReviewStatus::Mastered => self.mastered += 1,
        }
    }
}

/// Summary of a learner's progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub total_items: usize,
    pub by_status: StatusCounts,
    pub due_now: usize,
    pub total_reviews: u32,
    pub correct_count: u32,
    pub accuracy: f64,
    /// Mean ease factor of items reviewed at least once.
    pub average_ease: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<DateTime<Utc>>,
}

impl LearnerStats {
    /// Compute statistics as of `as_of`. Status is re-derived from each snapshot.
    pub fn from_states<'a, I>(states: I, as_of: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ReviewState>,
    {
        let states: Vec<&ReviewState> = states.into_iter().collect();
        let mut stats = Self {
            total_items: states.len(),
            due_now: due_count(states.iter().copied(), as_of),
            next_due_date: next_due_date(states.iter().copied(), as_of),
            ..Self::default()
        };

        let mut ease_sum = 0.0;
        let mut reviewed = 0u32;

        for state in &states {
            stats.by_status.add(state.classify());
            stats.total_reviews = stats.total_reviews.saturating_add(state.total_reviews);
            stats.correct_count = stats.correct_count.saturating_add(state.correct_count);

            if state.last_review_date.is_some() {
                ease_sum += state.ease_factor;
                reviewed = reviewed.saturating_add(1);
            }
        }

        if stats.total_reviews > 0 {
            stats.accuracy = f64::from(stats.correct_count) / f64::from(stats.total_reviews);
        }
        if reviewed > 0 {
            stats.average_ease = Some(ease_sum / f64::from(reviewed));
        }

        stats
    }
}
