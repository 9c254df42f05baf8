use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::delivery::{DeliveryRequest, DeliveryStatus};

/// Reporting window, inclusive calendar-day semantics. Each endpoint
/// accepts its own subset of periods; anything outside that subset falls
/// back to the endpoint's default rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
    All,
}

/// Periods honored by the general statistics endpoint.
pub const OVERVIEW_PERIODS: &[Period] = &[Period::Today, Period::Week, Period::Month, Period::Year];
/// Periods honored by the driver and customer statistics endpoints.
pub const PERSONAL_PERIODS: &[Period] = &[Period::Today, Period::Week, Period::Month];

impl Period {
    fn from_str(raw: &str) -> Option<Period> {
        match raw {
            "today" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    pub fn parse(raw: Option<&str>, accepted: &[Period], default: Period) -> Period {
        raw.and_then(Period::from_str)
            .filter(|period| accepted.contains(period))
            .unwrap_or(default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }

    pub fn includes(&self, at: DateTime<Utc>) -> bool {
        let days = match self {
            Period::Today => 0,
            Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
            Period::All => return true,
        };
        let today = Utc::now().date_naive();
        let date = at.date_naive();
        date <= today && date >= today - Duration::days(days)
    }
}

fn count_in(requests: &[DeliveryRequest], period: Period, status: Option<DeliveryStatus>) -> usize {
    requests
        .iter()
        .filter(|r| period.includes(r.created_at))
        .filter(|r| status.map_or(true, |s| r.status == s))
        .count()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
pub struct OverviewStats {
    #[serde(rename = "totalDeliveries")]
    pub total_deliveries: usize,
    #[serde(rename = "completedDeliveries")]
    pub completed_deliveries: usize,
    #[serde(rename = "pendingDeliveries")]
    pub pending_deliveries: usize,
    #[serde(rename = "inProgressDeliveries")]
    pub in_progress_deliveries: usize,
    #[serde(rename = "totalDistance")]
    pub total_distance: String,
    #[serde(rename = "totalEarnings")]
    pub total_earnings: f64,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
    #[serde(rename = "onTimeDeliveryRate")]
    pub on_time_delivery_rate: f64,
}

/// Status counts are real; distance, earnings, rating, and on-time rate are
/// fixed placeholder values with no data source behind them.
pub fn overview(requests: &[DeliveryRequest], period: Period) -> OverviewStats {
    OverviewStats {
        total_deliveries: count_in(requests, period, None),
        completed_deliveries: count_in(requests, period, Some(DeliveryStatus::Completed)),
        pending_deliveries: count_in(requests, period, Some(DeliveryStatus::Pending)),
        in_progress_deliveries: count_in(requests, period, Some(DeliveryStatus::InProgress)),
        total_distance: "450 km".to_string(),
        total_earnings: 1250.50,
        average_rating: 4.8,
        on_time_delivery_rate: 95.5,
    }
}

#[derive(Debug, Serialize)]
pub struct DriverStats {
    #[serde(rename = "totalDeliveries")]
    pub total_deliveries: usize,
    #[serde(rename = "completedDeliveries")]
    pub completed_deliveries: usize,
    #[serde(rename = "pendingDeliveries")]
    pub pending_deliveries: usize,
    #[serde(rename = "inProgressDeliveries")]
    pub in_progress_deliveries: usize,
    #[serde(rename = "assignedDeliveries")]
    pub assigned_deliveries: usize,
    #[serde(rename = "todayCompleted")]
    pub today_completed: usize,
    #[serde(rename = "todayPending")]
    pub today_pending: usize,
    #[serde(rename = "weekCompleted")]
    pub week_completed: usize,
    #[serde(rename = "monthCompleted")]
    pub month_completed: usize,
    #[serde(rename = "totalEarnings")]
    pub total_earnings: f64,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
    #[serde(rename = "onTimeDeliveryRate")]
    pub on_time_delivery_rate: f64,
    pub period: &'static str,
}

/// Earnings, rating, and on-time rate are placeholder formulas over the
/// completed count, not real pricing or review data.
pub fn driver_stats(requests: &[DeliveryRequest], period: Period) -> DriverStats {
    let completed = count_in(requests, period, Some(DeliveryStatus::Completed));

    let today_pending = requests
        .iter()
        .filter(|r| Period::Today.includes(r.created_at))
        .filter(|r| {
            matches!(
                r.status,
                DeliveryStatus::Pending | DeliveryStatus::Assigned
            )
        })
        .count();

    DriverStats {
        total_deliveries: count_in(requests, period, None),
        completed_deliveries: completed,
        pending_deliveries: count_in(requests, period, Some(DeliveryStatus::Pending)),
        in_progress_deliveries: count_in(requests, period, Some(DeliveryStatus::InProgress)),
        assigned_deliveries: count_in(requests, period, Some(DeliveryStatus::Assigned)),
        today_completed: count_in(requests, Period::Today, Some(DeliveryStatus::Completed)),
        today_pending,
        week_completed: count_in(requests, Period::Week, Some(DeliveryStatus::Completed)),
        month_completed: count_in(requests, Period::Month, Some(DeliveryStatus::Completed)),
        total_earnings: round2(completed as f64 * 25.0),
        average_rating: round1((4.5 + completed as f64 * 0.01).min(5.0)),
        on_time_delivery_rate: round1((95.0 + completed as f64 * 0.1).min(100.0)),
        period: period.as_str(),
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerStats {
    #[serde(rename = "totalDeliveries")]
    pub total_deliveries: usize,
    #[serde(rename = "completedDeliveries")]
    pub completed_deliveries: usize,
    #[serde(rename = "pendingDeliveries")]
    pub pending_deliveries: usize,
    #[serde(rename = "inProgressDeliveries")]
    pub in_progress_deliveries: usize,
    #[serde(rename = "cancelledDeliveries")]
    pub cancelled_deliveries: usize,
    #[serde(rename = "todayCompleted")]
    pub today_completed: usize,
    #[serde(rename = "todayPending")]
    pub today_pending: usize,
    #[serde(rename = "weekCompleted")]
    pub week_completed: usize,
    #[serde(rename = "monthCompleted")]
    pub month_completed: usize,
    #[serde(rename = "averageDeliveryTime")]
    pub average_delivery_time: String,
    #[serde(rename = "totalSpent")]
    pub total_spent: f64,
    pub period: &'static str,
}

/// Delivery time and spend are placeholder formulas over the completed
/// count, flagged as mock values.
pub fn customer_stats(requests: &[DeliveryRequest], period: Period) -> CustomerStats {
    let completed = count_in(requests, period, Some(DeliveryStatus::Completed));
    let any_completed = requests
        .iter()
        .any(|r| r.status == DeliveryStatus::Completed);

    let average_delivery_time = if any_completed {
        format!("{:.1} hours", 2.5 + completed as f64 * 0.1)
    } else {
        "N/A".to_string()
    };

    CustomerStats {
        total_deliveries: count_in(requests, period, None),
        completed_deliveries: completed,
        pending_deliveries: count_in(requests, period, Some(DeliveryStatus::Pending)),
        in_progress_deliveries: count_in(requests, period, Some(DeliveryStatus::InProgress)),
        cancelled_deliveries: count_in(requests, period, Some(DeliveryStatus::Cancelled)),
        today_completed: count_in(requests, Period::Today, Some(DeliveryStatus::Completed)),
        today_pending: count_in(requests, Period::Today, Some(DeliveryStatus::Pending)),
        week_completed: count_in(requests, Period::Week, Some(DeliveryStatus::Completed)),
        month_completed: count_in(requests, Period::Month, Some(DeliveryStatus::Completed)),
        average_delivery_time,
        total_spent: round2(completed as f64 * 15.0),
        period: period.as_str(),
    }
}
