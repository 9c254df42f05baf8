use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Success,
    Failed,
}

/// Append-only audit record for one sync attempt. Never updated or deleted
/// on its own; removed only when its delivery request is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLog {
    pub delivery_request: u64,
    pub outcome: SyncOutcome,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl SyncLog {
    pub fn new(delivery_request: u64, outcome: SyncOutcome, message: impl Into<String>) -> Self {
        Self {
            delivery_request,
            outcome,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
