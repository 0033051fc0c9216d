//! Core review scheduling library shared by the backend and any client.
//!
//! Provides:
//! - SM-2 spaced repetition scheduling
//! - Status classification from a state snapshot
//! - Due-item selection for review sessions
//! - Learner statistics and the XP rank ladder
//! - Shared types (ReviewState, Quality, ReviewStatus, etc.)

pub mod algorithm;
pub mod classify;
pub mod error;
pub mod queue;
pub mod rank;
pub mod stats;
pub mod types;

pub use algorithm::sm2::Sm2;
pub use algorithm::{get_algorithm, SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{RankError, Result, SchedulerError};
pub use queue::{due_count, due_items, next_due_date, DueItem};
pub use rank::{Rank, RankProgress, RankTable};
pub use stats::{LearnerStats, StatusCounts};
pub use types::{
    Quality, ReviewEvent, ReviewState, ReviewStatus, StateAnomaly, INITIAL_EASE_FACTOR,
    MIN_EASE_FACTOR,
};
