use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use crate::models::delivery::DeliveryRequest;
use crate::models::route::RoutePlan;
use crate::models::sync_log::SyncLog;
use crate::models::user::{Role, User};
use crate::observability::metrics::Metrics;

/// In-process store. Routes are keyed by their delivery request id (1:1);
/// sync logs get their own sequence so the audit trail stays append-only.
pub struct AppState {
    pub users: DashMap<u64, User>,
    pub requests: DashMap<u64, DeliveryRequest>,
    pub routes: DashMap<u64, RoutePlan>,
    pub sync_logs: DashMap<u64, SyncLog>,
    pub access_tokens: DashMap<String, u64>,
    pub refresh_tokens: DashMap<String, u64>,
    pub metrics: Metrics,
    pub page_size: usize,
    next_user_id: AtomicU64,
    next_request_id: AtomicU64,
    next_sync_log_id: AtomicU64,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            users: DashMap::new(),
            requests: DashMap::new(),
            routes: DashMap::new(),
            sync_logs: DashMap::new(),
            access_tokens: DashMap::new(),
            refresh_tokens: DashMap::new(),
            metrics: Metrics::new(),
            page_size,
            next_user_id: AtomicU64::new(1),
            next_request_id: AtomicU64::new(1),
            next_sync_log_id: AtomicU64::new(1),
        }
    }

    pub fn next_user_id(&self) -> u64 {
        self.next_user_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn append_sync_log(&self, log: SyncLog) -> u64 {
        let id = self.next_sync_log_id.fetch_add(1, Ordering::Relaxed);
        self.sync_logs.insert(id, log);
        id
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
    }

    /// The admin account is not self-service; it is seeded from config at
    /// startup (and by tests).
    pub fn seed_admin(&self, email: &str, password: &str) -> u64 {
        if let Some(existing) = self.user_by_email(email) {
            return existing.id;
        }

        let id = self.next_user_id();
        self.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                username: "admin".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                phone: String::new(),
                role: Role::Admin,
                password: password.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Records visible to a caller under the uniform ownership rule: admin
    /// sees all, a customer their own, a driver those assigned to them.
    pub fn visible_requests(&self, user: &User) -> Vec<DeliveryRequest> {
        self.requests
            .iter()
            .filter(|entry| match user.role {
                Role::Admin => true,
                Role::Customer => entry.value().customer == user.id,
                Role::Driver => entry.value().driver == Some(user.id),
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Hard delete with cascade over the owned route and sync logs.
    pub fn remove_request(&self, id: u64) -> Option<DeliveryRequest> {
        let removed = self.requests.remove(&id).map(|(_, request)| request);
        if removed.is_some() {
            self.routes.remove(&id);
            self.sync_logs.retain(|_, log| log.delivery_request != id);
        }
        removed
    }
}
