use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::rest::requests::scoped_record;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::geo::{plan_route, GeoPoint};
use crate::models::route::{RoutePlan, TravelMode};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/directions/", get(directions))
}

#[derive(Deserialize)]
pub struct DirectionsQuery {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
    pub mode: Option<String>,
    pub request_id: Option<u64>,
}

async fn directions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<DirectionsQuery>,
) -> Result<Json<Value>, AppError> {
    user.forbid_admin()?;

    let mode = match query.mode.as_deref() {
        None => TravelMode::Driving,
        Some(raw) => TravelMode::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("invalid mode: {raw}")))?,
    };

    let pickup = GeoPoint {
        lat: query.pickup_lat,
        lng: query.pickup_lng,
    };
    let dropoff = GeoPoint {
        lat: query.dropoff_lat,
        lng: query.dropoff_lng,
    };
    let leg = plan_route(&pickup, &dropoff, mode);

    // A route is stored at most once per request; later computations never
    // overwrite it.
    if let Some(request_id) = query.request_id {
        scoped_record(&state, &user.0, request_id)?;
        state.routes.entry(request_id).or_insert_with(|| RoutePlan {
            delivery_request: request_id,
            distance: leg.distance.clone(),
            duration: leg.duration.clone(),
            polyline: leg.polyline.clone(),
            mode,
            created_at: Utc::now(),
        });
    }

    Ok(Json(json!({
        "success": true,
        "data": { "route": leg }
    })))
}
