use std::cmp::Ordering;

use serde::Serialize;

use crate::models::user::Role;
use crate::state::AppState;

/// A driver can take new work while carrying fewer than this many active
/// deliveries.
const AVAILABLE_BELOW: usize = 3;
/// Looser pre-filter applied when the caller asks for available drivers
/// only.
const LISTING_BELOW: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct PartnerSummary {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub rating: f64,
    pub distance: String,
    pub available: bool,
    pub total_deliveries: usize,
    pub completed_deliveries: usize,
    pub active_deliveries: usize,
}

/// Snapshot of every driver's workload, recomputed per request. Rating and
/// distance are placeholders derived from the completed count and the
/// numeric driver id; there is no real rating system or geodistance source
/// behind them.
pub fn partner_listing(state: &AppState, available_only: bool) -> Vec<PartnerSummary> {
    let mut partners = Vec::new();

    for entry in state.users.iter() {
        let driver = entry.value();
        if driver.role != Role::Driver {
            continue;
        }

        let mut total_deliveries = 0;
        let mut completed_deliveries = 0;
        let mut active_deliveries = 0;
        for request in state.requests.iter() {
            if request.value().driver != Some(driver.id) {
                continue;
            }
            total_deliveries += 1;
            if request.value().status == crate::models::delivery::DeliveryStatus::Completed {
                completed_deliveries += 1;
            }
            if request.value().status.is_active() {
                active_deliveries += 1;
            }
        }

        if available_only && active_deliveries >= LISTING_BELOW {
            continue;
        }

        let rating = 4.5 + completed_deliveries as f64 * 0.01;
        let phone = if driver.phone.trim().is_empty() {
            "N/A".to_string()
        } else {
            driver.phone.clone()
        };

        partners.push(PartnerSummary {
            id: driver.id,
            name: driver.partner_name(),
            email: driver.email.clone(),
            phone,
            rating: (rating * 10.0).round() / 10.0,
            distance: format!("{}.{} km", 2 + driver.id % 5, driver.id % 10),
            available: active_deliveries < AVAILABLE_BELOW,
            total_deliveries,
            completed_deliveries,
            active_deliveries,
        });
    }

    partners.sort_by(|a, b| {
        b.available
            .cmp(&a.available)
            .then(b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
    });

    partners
}
