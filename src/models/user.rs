use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marketplace member, keyed by `user:{userId}`
///
/// `userId` is normally the member's wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub wallet_address: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farcaster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farcaster_username: Option<String>,
}
