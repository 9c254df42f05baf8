use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::InProgress => "in_progress",
            DeliveryStatus::Completed => "completed",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses counting as an in-flight delivery for a driver.
    pub fn is_active(&self) -> bool {
        matches!(self, DeliveryStatus::Assigned | DeliveryStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Pending,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Failed => "failed",
        }
    }
}

/// One side of a coordinate set. Either component may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Nested coordinate structure used on the wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub pickup: CoordinatePair,
    #[serde(default)]
    pub dropoff: CoordinatePair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub id: u64,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_note: String,
    pub status: DeliveryStatus,
    pub sync_status: SyncStatus,
    pub pending_sync: bool,
    pub pickup_latitude: Option<f64>,
    pub pickup_longitude: Option<f64>,
    pub dropoff_latitude: Option<f64>,
    pub dropoff_longitude: Option<f64>,
    /// Customer who created the request. Immutable after creation.
    pub customer: u64,
    pub driver: Option<u64>,
    pub assigned_by: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl DeliveryRequest {
    /// New record with lifecycle defaults. A request flagged as created
    /// offline starts with `sync_status = pending` regardless of what the
    /// client supplied.
    pub fn new(id: u64, customer: u64, pending_sync: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            pickup_address: String::new(),
            dropoff_address: String::new(),
            customer_name: String::new(),
            customer_phone: String::new(),
            delivery_note: String::new(),
            status: DeliveryStatus::Pending,
            sync_status: if pending_sync {
                SyncStatus::Pending
            } else {
                SyncStatus::Synced
            },
            pending_sync,
            pickup_latitude: None,
            pickup_longitude: None,
            dropoff_latitude: None,
            dropoff_longitude: None,
            customer,
            driver: None,
            assigned_by: None,
            created_at: now,
            updated_at: now,
            synced_at: None,
            assigned_at: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            pickup: CoordinatePair {
                latitude: self.pickup_latitude,
                longitude: self.pickup_longitude,
            },
            dropoff: CoordinatePair {
                latitude: self.dropoff_latitude,
                longitude: self.dropoff_longitude,
            },
        }
    }

    pub fn set_coordinates(&mut self, coords: &Coordinates) {
        self.pickup_latitude = coords.pickup.latitude.map(round_coordinate);
        self.pickup_longitude = coords.pickup.longitude.map(round_coordinate);
        self.dropoff_latitude = coords.dropoff.latitude.map(round_coordinate);
        self.dropoff_longitude = coords.dropoff.longitude.map(round_coordinate);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Idempotent: a second call leaves the record in the same terminal
    /// sync state, with a refreshed `synced_at` stamp.
    pub fn mark_as_synced(&mut self) {
        self.sync_status = SyncStatus::Synced;
        self.pending_sync = false;
        self.synced_at = Some(Utc::now());
        self.touch();
    }

    pub fn assign_driver(&mut self, driver: u64, assigned_by: u64) {
        self.driver = Some(driver);
        self.status = DeliveryStatus::Assigned;
        self.assigned_by = Some(assigned_by);
        self.assigned_at = Some(Utc::now());
        self.touch();
    }
}

/// Coordinates are stored with six decimal places, matching the wire
/// contract's precision.
fn round_coordinate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
