//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use vocab_review_backend::models::{ReviewState, ReviewStatus};

/// Create a submit review request body.
pub fn submit_review_request(item_id: &str, quality: i64) -> serde_json::Value {
    json!({
        "itemId": item_id,
        "quality": quality,
        "timeTaken": 2000
    })
}

/// Create a vocabulary review request body (item in the path).
pub fn item_review_request(quality: i64) -> serde_json::Value {
    json!({ "quality": quality })
}

/// A previously reviewed state due `days_from_now` days from now.
pub fn state_due_in(days_from_now: i64) -> ReviewState {
    let now = Utc::now();
    state_due_at(now + Duration::days(days_from_now), now - Duration::days(30))
}

/// A previously reviewed state due at `due`.
pub fn state_due_at(due: DateTime<Utc>, reviewed_at: DateTime<Utc>) -> ReviewState {
    ReviewState {
        repetitions: 2,
        interval: 6,
        last_review_date: Some(reviewed_at),
        next_review_date: due,
        status: ReviewStatus::Review,
        total_reviews: 2,
        correct_count: 2,
        ..ReviewState::new(reviewed_at)
    }
}

/// Generate a unique item ID to avoid collisions in shared databases.
pub fn unique_item_id(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}
