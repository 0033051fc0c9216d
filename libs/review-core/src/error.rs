//! Error types for review-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised before a review is applied. State is never mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("quality must be an integer between 0 and 5, got {0}")]
    InvalidQuality(i64),

    #[error("invalid review state: {field} = {value}")]
    InvalidState { field: &'static str, value: f64 },
}

/// Errors building a rank table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("rank table is empty")]
    Empty,

    #[error("first rank {name} must start at 0 XP, starts at {min_xp}")]
    FirstRankNotZero { name: String, min_xp: u32 },

    #[error("rank {name} starts at {min_xp} but the previous rank ends at {previous_max}")]
    Gap {
        name: String,
        min_xp: u32,
        previous_max: u32,
    },

    #[error("rank {name} has max_xp {max_xp} below min_xp {min_xp}")]
    InvertedRange { name: String, min_xp: u32, max_xp: u32 },

    #[error("only the last rank may be open-ended, {name} is not last")]
    OpenEndedNotLast { name: String },
}
