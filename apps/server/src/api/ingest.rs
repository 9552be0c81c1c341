use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use cardprice_core::ingestion::{IngestionRequest, IngestionResult};

use crate::{error::ApiResult, main_lib::AppState};

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestionRequest>,
) -> ApiResult<Json<IngestionResult>> {
    tracing::info!("Ingestion triggered for {}", request.source);
    let result = state.ingestor.ingest(request).await?;
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ingest", post(ingest))
}
