use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Back-office audit trail entry for recent booking activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub action: String,
    /// Either a bare id string or the populated user document.
    pub user_id: serde_json::Value,
    /// Either a bare id string or the populated booking document.
    pub booking_id: serde_json::Value,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}
