use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::engine::statistics::{
    customer_stats, driver_stats, overview, Period, OVERVIEW_PERIODS, PERSONAL_PERIODS,
};
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/statistics/", get(general_statistics))
        .route("/statistics/driver/", get(driver_statistics))
        .route("/statistics/customer/", get(customer_statistics))
}

#[derive(Deserialize)]
pub struct StatisticsQuery {
    pub period: Option<String>,
}

async fn general_statistics(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Value>, AppError> {
    user.forbid_admin()?;

    let period = Period::parse(query.period.as_deref(), OVERVIEW_PERIODS, Period::Today);
    let records = state.visible_requests(&user.0);

    Ok(Json(json!({
        "success": true,
        "data": overview(&records, period)
    })))
}

async fn driver_statistics(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Value>, AppError> {
    user.require_role(Role::Driver, "view driver statistics")?;

    let period = Period::parse(query.period.as_deref(), PERSONAL_PERIODS, Period::All);
    let records = state.visible_requests(&user.0);

    Ok(Json(json!({
        "success": true,
        "data": driver_stats(&records, period)
    })))
}

async fn customer_statistics(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Value>, AppError> {
    user.require_role(Role::Customer, "view customer statistics")?;

    let period = Period::parse(query.period.as_deref(), PERSONAL_PERIODS, Period::All);
    let records = state.visible_requests(&user.0);

    Ok(Json(json!({
        "success": true,
        "data": customer_stats(&records, period)
    })))
}
