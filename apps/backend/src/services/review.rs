//! Review submission service.
//!
//! Validates a submission before anything is read or written, then runs the
//! scheduler inside the store's per-(learner, item) critical section.

use chrono::{DateTime, Utc};
use review_core::{Quality, SpacedRepetitionAlgorithm};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::ReviewState;
use crate::AppState;

/// A validated review submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSubmission {
    pub item_id: String,
    pub quality: Quality,
    pub time_taken: Option<u32>,
}

impl ReviewSubmission {
    /// Validate raw request fields, naming the first offending field.
    pub fn parse(
        item_id: Option<&Value>,
        quality: Option<&Value>,
        time_taken: Option<&Value>,
    ) -> Result<Self> {
        Ok(Self {
            item_id: parse_item_id(item_id)?,
            quality: parse_quality(quality)?,
            time_taken: parse_time_taken(time_taken)?,
        })
    }
}

fn parse_item_id(raw: Option<&Value>) -> Result<String> {
    match raw {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(ApiError::invalid_field("itemId", "is required"))
        }
        Some(_) => Err(ApiError::invalid_field("itemId", "must be a string")),
    }
}

fn parse_quality(raw: Option<&Value>) -> Result<Quality> {
    let value = match raw {
        None | Some(Value::Null) => {
            return Err(ApiError::invalid_field("quality", "is required"));
        }
        Some(value) => value,
    };

    let number = value.as_i64().ok_or_else(|| {
        ApiError::invalid_field("quality", "must be an integer between 0 and 5")
    })?;

    Ok(Quality::new(number)?)
}

fn parse_time_taken(raw: Option<&Value>) -> Result<Option<u32>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|ms| u32::try_from(ms).ok())
            .map(Some)
            .ok_or_else(|| {
                ApiError::invalid_field("timeTaken", "must be a non-negative integer of milliseconds")
            }),
    }
}

/// Apply a review for `learner_id` at `now` and persist the new state.
///
/// Unknown items are rejected; a first review of a known item creates its
/// state. A failed submission leaves the stored state untouched.
pub async fn submit_review(
    state: &AppState,
    learner_id: Uuid,
    submission: ReviewSubmission,
    now: DateTime<Utc>,
) -> Result<ReviewState> {
    if state.store.get_item(&submission.item_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Vocabulary item {} not found",
            submission.item_id
        )));
    }

    let scheduler = state.scheduler.clone();
    let initial = scheduler.initial_state(now);
    let quality = submission.quality;
    let time_taken = submission.time_taken;

    let next = state
        .store
        .review_item(learner_id, &submission.item_id, initial, move |current| {
            let result = scheduler.schedule(&current, quality, now, time_taken)?;
            Ok(result.new_state)
        })
        .await?;

    tracing::info!(
        learner_id = %learner_id,
        item_id = %submission.item_id,
        quality = quality.value(),
        interval = next.interval,
        status = %next.status,
        "review recorded"
    );

    Ok(next)
}
