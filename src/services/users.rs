// User profile operations

use chrono::Utc;
use serde::Deserialize;

use super::present;
use crate::error::ApiError;
use crate::models::User;
use crate::store::{keys, Records};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub wallet_address: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Partial user update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub skills: Option<Vec<String>>,
    pub farcaster_id: Option<FarcasterId>,
    pub farcaster_username: Option<String>,
}

/// Farcaster ids arrive as JSON numbers from the Hub and as strings from forms
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FarcasterId {
    Number(u64),
    Text(String),
}

impl From<FarcasterId> for String {
    fn from(id: FarcasterId) -> Self {
        match id {
            FarcasterId::Number(n) => n.to_string(),
            FarcasterId::Text(s) => s,
        }
    }
}

/// Look up a user; a miss is `Ok(None)`, not an error
pub async fn get_user(records: &Records, user_id: Option<String>) -> Result<Option<User>, ApiError> {
    let user_id = present(user_id).ok_or_else(|| ApiError::bad_request("userId required"))?;
    records
        .get(&keys::user(&user_id))
        .await
        .map_err(ApiError::store("Failed to fetch user"))
}

/// Create or overwrite the user stored under `userId`
pub async fn create_user(records: &Records, req: CreateUser) -> Result<User, ApiError> {
    let (Some(user_id), Some(wallet_address)) =
        (present(req.user_id), present(req.wallet_address))
    else {
        return Err(ApiError::bad_request("userId and walletAddress required"));
    };

    let user = User {
        user_id,
        username: present(req.username),
        wallet_address,
        skills: req.skills.unwrap_or_default(),
        created_at: Utc::now(),
        farcaster_id: None,
        farcaster_username: None,
    };

    records
        .put(&keys::user(&user.user_id), &user)
        .await
        .map_err(ApiError::store("Failed to create user"))?;
    Ok(user)
}

pub async fn update_user(records: &Records, req: UpdateUser) -> Result<User, ApiError> {
    let user_id = present(req.user_id).ok_or_else(|| ApiError::bad_request("userId required"))?;
    let key = keys::user(&user_id);

    let mut user: User = records
        .get(&key)
        .await
        .map_err(ApiError::store("Failed to update user"))?
        .ok_or(ApiError::NotFound("User not found"))?;

    if let Some(skills) = req.skills {
        user.skills = skills;
    }
    if let Some(username) = present(req.username) {
        user.username = Some(username);
    }
    if let Some(fid) = present(req.farcaster_id.map(String::from)) {
        user.farcaster_id = Some(fid);
    }
    if let Some(name) = present(req.farcaster_username) {
        user.farcaster_username = Some(name);
    }

    records
        .put(&key, &user)
        .await
        .map_err(ApiError::store("Failed to update user"))?;
    Ok(user)
}
