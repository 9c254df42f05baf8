use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::delivery::{Coordinates, DeliveryRequest, DeliveryStatus};
use crate::models::sync_log::{SyncLog, SyncOutcome};
use crate::models::user::{Role, User};
use crate::state::AppState;

/// One client-submitted delivery request from offline storage.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncPayload {
    pub local_id: Option<String>,
    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub dropoff_address: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub delivery_note: String,
    #[serde(default)]
    pub pending_sync: bool,
    pub coordinates: Option<Coordinates>,
    pub status: Option<DeliveryStatus>,
}

#[derive(Debug, Serialize)]
pub struct SyncedEntry {
    #[serde(rename = "localId")]
    pub local_id: String,
    #[serde(rename = "serverId")]
    pub server_id: u64,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FailedEntry {
    #[serde(rename = "localId")]
    pub local_id: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub synced: Vec<SyncedEntry>,
    pub failed: Vec<FailedEntry>,
    /// Part of the wire contract; no conflict detection exists, so this
    /// list is always empty.
    pub conflicts: Vec<serde_json::Value>,
}

/// Reconcile a batch of offline-created requests. Payloads are processed
/// independently and in order; one payload failing never aborts the rest
/// of the batch.
pub fn reconcile_batch(state: &AppState, caller: &User, payloads: Vec<SyncPayload>) -> SyncReport {
    let mut report = SyncReport::default();

    for payload in payloads {
        let local_id = payload.local_id.clone();
        match reconcile_one(state, caller, payload) {
            Ok(server_id) => {
                state
                    .metrics
                    .sync_attempts_total
                    .with_label_values(&["success"])
                    .inc();
                info!(server_id, local_id = local_id.as_deref(), "payload synced");
                report.synced.push(SyncedEntry {
                    local_id: local_id.unwrap_or_else(|| format!("local_{server_id}")),
                    server_id,
                    status: "synced",
                });
            }
            Err(error) => {
                state
                    .metrics
                    .sync_attempts_total
                    .with_label_values(&["failed"])
                    .inc();
                warn!(local_id = local_id.as_deref(), error, "payload failed to sync");
                report.failed.push(FailedEntry {
                    local_id: local_id
                        .unwrap_or_else(|| format!("local_{}", report.failed.len() + 1)),
                    error,
                });
            }
        }
    }

    report
}

fn reconcile_one(state: &AppState, caller: &User, payload: SyncPayload) -> Result<u64, String> {
    for (field, value) in [
        ("pickup_address", &payload.pickup_address),
        ("dropoff_address", &payload.dropoff_address),
        ("customer_name", &payload.customer_name),
        ("customer_phone", &payload.customer_phone),
    ] {
        if value.trim().is_empty() {
            return Err(format!("missing required field: {field}"));
        }
    }

    let existing = if payload.local_id.is_some() {
        find_same_day_match(state, caller.id, &payload)
    } else {
        None
    };

    let server_id = match existing {
        Some(id) => {
            let mut request = state
                .requests
                .get_mut(&id)
                .ok_or_else(|| format!("request {id} disappeared during sync"))?;
            apply_updatable_fields(&mut request, &payload);
            request.mark_as_synced();
            id
        }
        None => {
            if caller.role != Role::Customer {
                return Err("customer is required to create a request".to_string());
            }

            let id = state.next_request_id();
            let mut request = DeliveryRequest::new(id, caller.id, payload.pending_sync);
            request.pickup_address = payload.pickup_address.clone();
            apply_updatable_fields(&mut request, &payload);
            request.mark_as_synced();
            state.requests.insert(id, request);
            state.metrics.deliveries_created_total.inc();
            id
        }
    };

    state.append_sync_log(SyncLog::new(
        server_id,
        SyncOutcome::Success,
        format!("Successfully synced request ID: {server_id}"),
    ));

    Ok(server_id)
}

/// De-duplication is a heuristic match on (customer name, phone, pickup
/// address, same calendar day) scoped to the caller, kept for compatibility
/// with existing offline clients. It is not an idempotency key: two distinct
/// same-day deliveries with identical fields collide, and a retry past
/// midnight creates a duplicate.
fn find_same_day_match(state: &AppState, customer: u64, payload: &SyncPayload) -> Option<u64> {
    let today = chrono::Utc::now().date_naive();

    state
        .requests
        .iter()
        .filter(|entry| {
            let request = entry.value();
            request.customer == customer
                && request.customer_name == payload.customer_name
                && request.customer_phone == payload.customer_phone
                && request.pickup_address == payload.pickup_address
                && request.created_at.date_naive() == today
        })
        .max_by_key(|entry| (entry.value().created_at, entry.value().id))
        .map(|entry| entry.value().id)
}

/// Only the allow-listed mutable fields may change through sync; owner,
/// driver, and assignment fields never do.
fn apply_updatable_fields(request: &mut DeliveryRequest, payload: &SyncPayload) {
    request.dropoff_address = payload.dropoff_address.clone();
    request.customer_name = payload.customer_name.clone();
    request.customer_phone = payload.customer_phone.clone();
    request.delivery_note = payload.delivery_note.clone();
    if let Some(coords) = &payload.coordinates {
        request.set_coordinates(coords);
    }
    if let Some(status) = payload.status {
        request.status = status;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::delivery::SyncStatus;

    fn customer() -> User {
        User {
            id: 1,
            email: "jane@example.com".to_string(),
            username: "jane".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: "+111".to_string(),
            role: Role::Customer,
            password: "pw".to_string(),
            created_at: Utc::now(),
        }
    }

    fn driver() -> User {
        User {
            role: Role::Driver,
            id: 2,
            ..customer()
        }
    }

    fn payload(local_id: Option<&str>) -> SyncPayload {
        SyncPayload {
            local_id: local_id.map(str::to_string),
            pickup_address: "123 Main St, City".to_string(),
            dropoff_address: "456 Oak Ave, Town".to_string(),
            customer_name: "John Doe".to_string(),
            customer_phone: "+1234567890".to_string(),
            delivery_note: "Please ring doorbell".to_string(),
            pending_sync: true,
            coordinates: None,
            status: None,
        }
    }

    #[test]
    fn unmatched_payload_creates_one_record_and_one_success_log() {
        let state = AppState::new(10);
        let report = reconcile_batch(&state, &customer(), vec![payload(Some("local_123"))]);

        assert_eq!(report.synced.len(), 1);
        assert!(report.failed.is_empty());
        assert!(report.conflicts.is_empty());
        assert_eq!(report.synced[0].local_id, "local_123");

        let server_id = report.synced[0].server_id;
        let record = state.requests.get(&server_id).unwrap();
        assert_eq!(record.sync_status, SyncStatus::Synced);
        assert!(!record.pending_sync);
        assert!(record.synced_at.is_some());

        assert_eq!(state.sync_logs.len(), 1);
        let log = state.sync_logs.iter().next().unwrap();
        assert_eq!(log.value().outcome, SyncOutcome::Success);
        assert_eq!(log.value().delivery_request, server_id);
    }

    #[test]
    fn same_day_match_updates_instead_of_duplicating() {
        let state = AppState::new(10);
        let first = reconcile_batch(&state, &customer(), vec![payload(Some("local_1"))]);
        let server_id = first.synced[0].server_id;

        let mut retry = payload(Some("local_1"));
        retry.delivery_note = "Leave at the door".to_string();
        let second = reconcile_batch(&state, &customer(), vec![retry]);

        assert_eq!(second.synced.len(), 1);
        assert_eq!(second.synced[0].server_id, server_id);
        assert_eq!(state.requests.len(), 1);
        assert_eq!(
            state.requests.get(&server_id).unwrap().delivery_note,
            "Leave at the door"
        );
    }

    #[test]
    fn payload_without_local_id_always_creates() {
        let state = AppState::new(10);
        reconcile_batch(&state, &customer(), vec![payload(None)]);
        let report = reconcile_batch(&state, &customer(), vec![payload(None)]);

        assert_eq!(state.requests.len(), 2);
        let server_id = report.synced[0].server_id;
        assert_eq!(report.synced[0].local_id, format!("local_{server_id}"));
    }

    #[test]
    fn one_bad_payload_does_not_abort_the_batch() {
        let state = AppState::new(10);
        let mut bad = payload(Some("local_bad"));
        bad.pickup_address = String::new();

        let report = reconcile_batch(
            &state,
            &customer(),
            vec![bad, payload(Some("local_good"))],
        );

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].local_id, "local_bad");
        assert!(report.failed[0].error.contains("pickup_address"));
        assert_eq!(report.synced.len(), 1);
        assert_eq!(report.synced[0].local_id, "local_good");
        assert_eq!(state.requests.len(), 1);
    }

    #[test]
    fn driver_cannot_create_through_sync() {
        let state = AppState::new(10);
        let report = reconcile_batch(&state, &driver(), vec![payload(Some("local_1"))]);

        assert!(report.synced.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("customer"));
        assert!(state.requests.is_empty());
    }

    #[test]
    fn sync_applies_status_from_payload() {
        let state = AppState::new(10);
        let mut p = payload(Some("local_1"));
        p.status = Some(DeliveryStatus::Cancelled);
        let report = reconcile_batch(&state, &customer(), vec![p]);

        let record = state.requests.get(&report.synced[0].server_id).unwrap();
        assert_eq!(record.status, DeliveryStatus::Cancelled);
    }
}
