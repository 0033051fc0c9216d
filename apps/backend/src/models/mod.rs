//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from review-core
pub use review_core::{
    DueItem, LearnerStats, Quality, RankProgress, ReviewEvent, ReviewState, ReviewStatus,
};

// === Database Entity Types ===

/// Learner known to the external auth service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Learner {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Vocabulary item from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub term: String,
    pub translation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyItem {
    pub fn new(id: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            translation: None,
            created_at: Utc::now(),
        }
    }
}

/// Review state row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbReviewState {
    pub learner_id: Uuid,
    pub item_id: String,
    pub seq: i64,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: Option<DateTime<Utc>>,
    pub status: String,
    pub total_reviews: i32,
    pub correct_count: i32,
    pub review_history: Json<Vec<ReviewEvent>>,
}

impl DbReviewState {
    /// Convert to review-core ReviewState.
    ///
    /// Negative counters read as zero and an unknown status reads as `new`;
    /// the caller sanitizes the result.
    pub fn to_core_state(&self) -> ReviewState {
        ReviewState {
            ease_factor: self.ease_factor,
            interval: u32::try_from(self.interval_days).unwrap_or(0),
            repetitions: u32::try_from(self.repetitions).unwrap_or(0),
            next_review_date: self.next_review_date,
            last_review_date: self.last_review_date,
            status: ReviewStatus::parse(&self.status).unwrap_or_default(),
            total_reviews: u32::try_from(self.total_reviews).unwrap_or(0),
            correct_count: u32::try_from(self.correct_count).unwrap_or(0),
            review_history: self.review_history.0.clone(),
        }
    }
}

/// Clamp a counter into a Postgres INTEGER column.
pub fn to_db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Review state joined with its item, as returned by the due query
#[derive(Debug, Clone)]
pub struct DueEntry {
    pub item_id: String,
    pub term: String,
    pub sequence: i64,
    pub state: ReviewState,
}

impl DueItem for DueEntry {
    fn next_review_date(&self) -> DateTime<Utc> {
        self.state.next_review_date
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }
}

// === API Request/Response Types ===

/// POST /api/reviews body.
///
/// Fields are loosely typed so missing or malformed values can be reported
/// by name instead of as a generic body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub item_id: Option<serde_json::Value>,
    pub quality: Option<serde_json::Value>,
    pub time_taken: Option<serde_json::Value>,
}

/// POST /api/vocabulary/{id}/review body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReviewRequest {
    pub quality: Option<serde_json::Value>,
    pub time_taken: Option<serde_json::Value>,
}

/// Review submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub state: ReviewState,
    pub next_review_date: DateTime<Utc>,
    pub status: ReviewStatus,
}

impl From<ReviewState> for ReviewResponse {
    fn from(state: ReviewState) -> Self {
        Self {
            next_review_date: state.next_review_date,
            status: state.status,
            state,
        }
    }
}

/// GET /api/reviews/due query
#[derive(Debug, Clone, Deserialize)]
pub struct DueQuery {
    pub limit: Option<usize>,
}

/// One due item in the review queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItemResponse {
    pub item_id: String,
    pub term: String,
    pub state: ReviewState,
}

impl From<DueEntry> for DueItemResponse {
    fn from(entry: DueEntry) -> Self {
        Self {
            item_id: entry.item_id,
            term: entry.term,
            state: entry.state,
        }
    }
}

/// GET /api/reviews/due response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueResponse {
    pub count: usize,
    pub items: Vec<DueItemResponse>,
}

/// GET /api/rank query
#[derive(Debug, Clone, Deserialize)]
pub struct RankQuery {
    pub xp: Option<u32>,
}
