use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::rest::requests::DeliveryRequestView;
use crate::auth::AuthUser;
use crate::engine::reconcile::{reconcile_batch, SyncPayload};
use crate::error::AppError;
use crate::models::delivery::SyncStatus;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync/pending/", post(sync_pending))
        .route("/sync/status/", get(sync_status))
}

#[derive(Deserialize)]
pub struct SyncRequest {
    pub requests: Vec<SyncPayload>,
}

async fn sync_pending(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<Value>, AppError> {
    user.forbid_admin()?;

    let start = Instant::now();
    let report = reconcile_batch(&state, &user.0, payload.requests);
    state
        .metrics
        .sync_batch_latency_seconds
        .observe(start.elapsed().as_secs_f64());

    info!(
        synced = report.synced.len(),
        failed = report.failed.len(),
        "sync batch reconciled"
    );

    Ok(Json(json!({ "success": true, "data": report })))
}

async fn sync_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    user.forbid_admin()?;

    let records = state.visible_requests(&user.0);
    let count_by = |status: SyncStatus| records.iter().filter(|r| r.sync_status == status).count();

    let visible_ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    let last_sync = state
        .sync_logs
        .iter()
        .filter(|entry| visible_ids.contains(&entry.value().delivery_request))
        .map(|entry| entry.value().created_at)
        .max();

    let pending_views: Vec<_> = records
        .iter()
        .filter(|r| r.sync_status == SyncStatus::Pending)
        .map(|r| DeliveryRequestView::new(&state, r))
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "lastSync": last_sync,
            "pendingCount": count_by(SyncStatus::Pending),
            "failedCount": count_by(SyncStatus::Failed),
            "syncedCount": count_by(SyncStatus::Synced),
            "pendingRequests": pending_views,
        }
    })))
}
