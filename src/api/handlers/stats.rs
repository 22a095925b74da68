use axum::extract::State;
use axum::Json;
use chrono::Utc;

use super::ApiResponse;
use crate::engine::aggregate;
use crate::models::ProtocolStats;
use crate::services::read_batch_or_empty;
use crate::AppState;

/// GET /api/stats
pub async fn summary(State(state): State<AppState>) -> Json<ApiResponse<ProtocolStats>> {
    let reads = read_batch_or_empty(
        state.reader.as_ref(),
        state.config.read_concurrency,
        state.config.max_markets,
    )
    .await;
    Json(ApiResponse::ok(aggregate(&reads, Utc::now())))
}
