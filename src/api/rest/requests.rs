use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::delivery::{
    Coordinates, DeliveryRequest, DeliveryStatus, SyncStatus,
};
use crate::models::user::{Role, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/delivery-requests/",
            get(list_requests).post(create_request),
        )
        .route("/delivery-requests/assigned/", get(list_assigned))
        .route(
            "/delivery-requests/:id/",
            get(get_request)
                .patch(update_request)
                .delete(delete_request),
        )
        .route("/debug/requests/", get(debug_list_all))
}

/// Full wire representation of a delivery request, with related user fields
/// resolved.
#[derive(Debug, Serialize)]
pub struct DeliveryRequestView {
    pub id: u64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_note: String,
    pub status: DeliveryStatus,
    pub sync_status: SyncStatus,
    pub pending_sync: bool,
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub customer_email: Option<String>,
    pub driver_email: Option<String>,
    pub driver_name: Option<String>,
    pub assigned_by_email: Option<String>,
}

impl DeliveryRequestView {
    pub fn new(state: &AppState, request: &DeliveryRequest) -> Self {
        let email_of =
            |id: u64| state.users.get(&id).map(|entry| entry.value().email.clone());
        let first_name_of =
            |id: u64| state.users.get(&id).map(|entry| entry.value().first_name.clone());

        Self {
            id: request.id,
            pickup_address: request.pickup_address.clone(),
            dropoff_address: request.dropoff_address.clone(),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            delivery_note: request.delivery_note.clone(),
            status: request.status,
            sync_status: request.sync_status,
            pending_sync: request.pending_sync,
            coordinates: request.coordinates(),
            created_at: request.created_at,
            updated_at: request.updated_at,
            synced_at: request.synced_at,
            assigned_at: request.assigned_at,
            customer_email: email_of(request.customer),
            driver_email: request.driver.and_then(email_of),
            driver_name: request.driver.and_then(first_name_of),
            assigned_by_email: request.assigned_by.and_then(email_of),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateDeliveryRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub delivery_note: String,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub pending_sync: bool,
}

#[derive(Deserialize)]
pub struct UpdateDeliveryRequest {
    pub status: Option<DeliveryStatus>,
    pub driver: Option<u64>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<DeliveryStatus>,
    pub sync_status: Option<SyncStatus>,
    pub pending_sync: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<usize>,
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(Role::Customer, "create delivery requests")?;

    for (field, value) in [
        ("pickup_address", &payload.pickup_address),
        ("dropoff_address", &payload.dropoff_address),
        ("customer_name", &payload.customer_name),
        ("customer_phone", &payload.customer_phone),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }

    let id = state.next_request_id();
    let mut request = DeliveryRequest::new(id, user.0.id, payload.pending_sync);
    request.pickup_address = payload.pickup_address;
    request.dropoff_address = payload.dropoff_address;
    request.customer_name = payload.customer_name;
    request.customer_phone = payload.customer_phone;
    request.delivery_note = payload.delivery_note;
    if let Some(coords) = &payload.coordinates {
        request.set_coordinates(coords);
    }

    let view = DeliveryRequestView::new(&state, &request);
    state.requests.insert(id, request);
    state.metrics.deliveries_created_total.inc();
    info!(request_id = id, customer = user.0.id, "delivery request created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": view })),
    ))
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let records = state.visible_requests(&user.0);
    Json(filtered_page(&state, records, &query))
}

async fn list_assigned(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    user.require_role(Role::Driver, "view assigned deliveries")?;

    let records: Vec<_> = state
        .visible_requests(&user.0)
        .into_iter()
        .filter(|request| request.status.is_active())
        .collect();

    Ok(Json(filtered_page(&state, records, &query)))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let request = scoped_record(&state, &user.0, id)?;
    Ok(Json(json!({
        "success": true,
        "data": DeliveryRequestView::new(&state, &request)
    })))
}

async fn update_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateDeliveryRequest>,
) -> Result<Json<Value>, AppError> {
    scoped_record(&state, &user.0, id)?;

    // Driver assignment is honored only for admin callers.
    if let Some(driver_id) = payload.driver {
        if user.0.role == Role::Admin {
            let is_driver = state
                .users
                .get(&driver_id)
                .map(|entry| entry.value().role == Role::Driver)
                .unwrap_or(false);
            if !is_driver {
                return Err(AppError::NotFound("driver not found".to_string()));
            }

            if let Some(mut request) = state.requests.get_mut(&id) {
                request.assign_driver(driver_id, user.0.id);
                info!(request_id = id, driver = driver_id, "driver assigned");
            }
        }
    }

    // No transition graph is enforced: any status may be patched onto any
    // record by an authorized caller.
    if let Some(status) = payload.status {
        if let Some(mut request) = state.requests.get_mut(&id) {
            request.status = status;
            request.touch();
        }
    }

    let request = state
        .requests
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("delivery request {id} not found")))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": request.id,
            "status": request.status,
            "driver": request.driver,
            "updatedAt": request.updated_at,
        }
    })))
}

async fn delete_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    scoped_record(&state, &user.0, id)?;
    state.remove_request(id);
    info!(request_id = id, "delivery request deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Delivery request deleted successfully"
    })))
}

async fn debug_list_all(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    if user.0.role != Role::Admin {
        return Err(AppError::Forbidden(
            "only admins can access this endpoint".to_string(),
        ));
    }

    let mut records: Vec<_> = state
        .requests
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    records.sort_by(|a, b| b.id.cmp(&a.id));

    let views: Vec<_> = records
        .iter()
        .map(|request| DeliveryRequestView::new(&state, request))
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "total_count": views.len(),
            "requests": views,
        }
    })))
}

/// Resolve a record the caller is allowed to act on. Records outside the
/// caller's scope are indistinguishable from missing ones.
pub fn scoped_record(
    state: &AppState,
    user: &User,
    id: u64,
) -> Result<DeliveryRequest, AppError> {
    state
        .requests
        .get(&id)
        .filter(|entry| match user.role {
            Role::Admin => true,
            Role::Customer => entry.value().customer == user.id,
            Role::Driver => entry.value().driver == Some(user.id),
        })
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("delivery request {id} not found")))
}

/// Apply the list filters, search, ordering, and pagination shared by the
/// listing endpoints.
fn filtered_page(state: &AppState, records: Vec<DeliveryRequest>, query: &ListQuery) -> Value {
    let mut records: Vec<_> = records
        .into_iter()
        .filter(|r| query.status.map_or(true, |s| r.status == s))
        .filter(|r| query.sync_status.map_or(true, |s| r.sync_status == s))
        .filter(|r| query.pending_sync.map_or(true, |p| r.pending_sync == p))
        .filter(|r| match &query.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                r.customer_name.to_lowercase().contains(&needle)
                    || r.pickup_address.to_lowercase().contains(&needle)
                    || r.dropoff_address.to_lowercase().contains(&needle)
            }
        })
        .collect();

    sort_records(&mut records, query.ordering.as_deref().unwrap_or("-created_at"));

    let limit = state.page_size.max(1);
    let total = records.len();
    let total_pages = total.div_ceil(limit).max(1);
    let page = query.page.unwrap_or(1).max(1);

    let start = (page - 1).saturating_mul(limit).min(total);
    let end = (start + limit).min(total);
    let views: Vec<_> = records[start..end]
        .iter()
        .map(|request| DeliveryRequestView::new(state, request))
        .collect();

    json!({
        "success": true,
        "data": {
            "requests": views,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": total,
                "totalPages": total_pages,
            }
        }
    })
}

fn sort_records(records: &mut [DeliveryRequest], ordering: &str) {
    let (field, descending) = match ordering.strip_prefix('-') {
        Some(field) => (field, true),
        None => (ordering, false),
    };

    match field {
        "updated_at" => records.sort_by_key(|r| r.updated_at),
        "status" => records.sort_by_key(|r| r.status.as_str()),
        "created_at" => records.sort_by_key(|r| r.created_at),
        // Unknown ordering fields fall back to newest-first.
        _ => {
            records.sort_by_key(|r| r.created_at);
            records.reverse();
            return;
        }
    }

    if descending {
        records.reverse();
    }
}
