//! Core types for vocabulary review scheduling.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Ease factor assigned to a state on first exposure.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor a state may carry.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Learning bucket shown to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    New,
    Learning,
    Review,
    Mastered,
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::New
    }
}

impl ReviewStatus {
    /// Get the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from the stored name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "review" => Some(Self::Review),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported recall grade, 0 (blackout) to 5 (instant recall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    /// Lowest grade that counts as a successful recall.
    pub const PASSING: u8 = 3;

    /// Create from any integer, rejecting values outside 0..=5.
    pub fn new(value: i64) -> Result<Self, SchedulerError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SchedulerError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this grade counts as a correct recall rather than a lapse.
    pub fn is_correct(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<i64> for Quality {
    type Error = SchedulerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// One entry of the review audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub date: DateTime<Utc>,
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
}

/// Memory record for one (learner, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: Option<DateTime<Utc>>,
    pub status: ReviewStatus,
    pub total_reviews: u32,
    pub correct_count: u32,
    #[serde(default)]
    pub review_history: Vec<ReviewEvent>,
}

impl ReviewState {
    /// Fresh state for an item first seen at `now`. It is due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 1,
            repetitions: 0,
            next_review_date: now,
            last_review_date: None,
            status: ReviewStatus::New,
            total_reviews: 0,
            correct_count: 0,
            review_history: Vec::new(),
        }
    }

    /// Repair a stored record that violates the state invariants.
    ///
    /// Returns every anomaly found so the caller can report it. An empty
    /// result means the record was already consistent and was left untouched.
    pub fn sanitize(&mut self) -> Vec<StateAnomaly> {
        let mut anomalies = Vec::new();

        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            anomalies.push(StateAnomaly::EaseBelowMinimum(self.ease_factor));
            self.ease_factor = MIN_EASE_FACTOR;
        }
        if self.interval < 1 {
            anomalies.push(StateAnomaly::IntervalBelowOne(self.interval));
            self.interval = 1;
        }
        if self.correct_count > self.total_reviews {
            anomalies.push(StateAnomaly::CorrectExceedsTotal {
                correct: self.correct_count,
                total: self.total_reviews,
            });
            self.correct_count = self.total_reviews;
        }

        let derived = self.classify();
        if derived != self.status {
            anomalies.push(StateAnomaly::StatusMismatch {
                stored: self.status,
                derived,
            });
            self.status = derived;
        }

        anomalies
    }
}

/// Inconsistency found in a stored review state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateAnomaly {
    EaseBelowMinimum(f64),
    IntervalBelowOne(u32),
    CorrectExceedsTotal { correct: u32, total: u32 },
    StatusMismatch { stored: ReviewStatus, derived: ReviewStatus },
}

impl fmt::Display for StateAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EaseBelowMinimum(ease) => {
                write!(f, "ease factor {ease} below minimum, clamped to {MIN_EASE_FACTOR}")
            }
            Self::IntervalBelowOne(interval) => {
                write!(f, "interval {interval} below one day, clamped to 1")
            }
            Self::CorrectExceedsTotal { correct, total } => {
                write!(f, "correct count {correct} exceeds total reviews {total}")
            }
            Self::StatusMismatch { stored, derived } => {
                write!(f, "stored status {stored} does not match derived status {derived}")
            }
        }
    }
}
