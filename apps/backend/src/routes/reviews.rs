//! Review endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::services::review::{submit_review, ReviewSubmission};
use crate::AppState;

/// POST /api/reviews
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    payload: std::result::Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>> {
    let Json(payload) = payload?;
    let submission = ReviewSubmission::parse(
        payload.item_id.as_ref(),
        payload.quality.as_ref(),
        payload.time_taken.as_ref(),
    )?;

    let next = submit_review(&state, auth.learner_id, submission, Utc::now()).await?;
    Ok(Json(next.into()))
}

/// POST /api/vocabulary/{id}/review
pub async fn submit_for_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Path(item_id): Path<String>,
    payload: std::result::Result<Json<ItemReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>> {
    let Json(payload) = payload?;
    let item_id = Value::String(item_id);
    let submission = ReviewSubmission::parse(
        Some(&item_id),
        payload.quality.as_ref(),
        payload.time_taken.as_ref(),
    )?;

    let next = submit_review(&state, auth.learner_id, submission, Utc::now()).await?;
    Ok(Json(next.into()))
}

/// GET /api/reviews/due
pub async fn due(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    query: std::result::Result<Query<DueQuery>, QueryRejection>,
) -> Result<Json<DueResponse>> {
    let Query(query) = query?;
    let limit = state.due_limits.resolve(query.limit);

    let entries = state
        .store
        .get_due_entries(auth.learner_id, Utc::now(), limit)
        .await?;

    let items: Vec<DueItemResponse> = entries.into_iter().map(Into::into).collect();

    Ok(Json(DueResponse {
        count: items.len(),
        items,
    }))
}

/// GET /api/reviews/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<LearnerStats>> {
    let states = state.store.get_learner_states(auth.learner_id).await?;
    Ok(Json(LearnerStats::from_states(&states, Utc::now())))
}
