pub mod auth;
pub mod directions;
pub mod partners;
pub mod requests;
pub mod statistics;
pub mod sync;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::models::delivery::SyncStatus;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .merge(auth::router())
        .merge(requests::router())
        .merge(partners::router())
        .merge(directions::router())
        .merge(sync::router())
        .merge(statistics::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    users: usize,
    requests: usize,
    sync_logs: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: state.users.len(),
        requests: state.requests.len(),
        sync_logs: state.sync_logs.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pending = state
        .requests
        .iter()
        .filter(|entry| entry.value().sync_status == SyncStatus::Pending)
        .count();
    state.metrics.pending_sync_requests.set(pending as i64);

    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
