use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use cardprice_core::audit::AuditLogEntry;
use cardprice_core::scheduler::{SchedulerRequest, SchedulerRunSummary};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

const DEFAULT_RUNS_LIMIT: usize = 20;

async fn run_scheduler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SchedulerRequest>,
) -> ApiResult<Json<SchedulerRunSummary>> {
    tracing::info!("Scheduler run triggered ({})", request.mode);
    let summary = state.scheduler.run(request).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
struct RunsQuery {
    limit: Option<usize>,
}

async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunsQuery>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let entries = state
        .audit_log
        .list_recent(query.limit.unwrap_or(DEFAULT_RUNS_LIMIT))?;
    Ok(Json(entries))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scheduler/run", post(run_scheduler))
        .route("/scheduler/runs", get(list_runs))
}
