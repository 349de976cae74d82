use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer review attached to a tour package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    pub package_id: String,
    pub user_id: String,
    pub user_name: String,
    pub comment: String,
    /// 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
