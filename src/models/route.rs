use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
}

impl TravelMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "driving" => Some(TravelMode::Driving),
            "walking" => Some(TravelMode::Walking),
            "bicycling" => Some(TravelMode::Bicycling),
            _ => None,
        }
    }
}

/// Stored route for a delivery request. One per request, written once and
/// never updated; deleted together with its request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    pub delivery_request: u64,
    pub distance: String,
    pub duration: String,
    pub polyline: String,
    pub mode: TravelMode,
    pub created_at: DateTime<Utc>,
}
