use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use cardprice_core::review::MatchReviewEntry;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Deserialize)]
struct ReviewQuery {
    limit: Option<usize>,
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Json<Vec<MatchReviewEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    let entries = state.review_queue.list_pending(limit)?;
    Ok(Json(entries))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/review-queue", get(list_pending))
}
