use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::engine::partners::partner_listing;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/partners/", get(list_partners))
}

#[derive(Deserialize)]
pub struct PartnersQuery {
    pub available_only: Option<String>,
}

async fn list_partners(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<PartnersQuery>,
) -> Json<Value> {
    let available_only = query
        .available_only
        .as_deref()
        .map(|raw| raw.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Json(json!({
        "success": true,
        "data": partner_listing(&state, available_only)
    }))
}
