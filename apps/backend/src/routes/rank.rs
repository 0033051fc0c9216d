//! Rank endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/rank?xp=N
pub async fn get(
    State(state): State<AppState>,
    query: std::result::Result<Query<RankQuery>, QueryRejection>,
) -> Result<Json<RankProgress>> {
    let Query(query) = query?;
    let xp = query
        .xp
        .ok_or_else(|| ApiError::invalid_field("xp", "is required"))?;

    Ok(Json(state.ranks.progress(xp)))
}
