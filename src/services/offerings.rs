// Skill offering operations

use chrono::Utc;
use serde::Deserialize;

use super::{nonzero, present};
use crate::error::ApiError;
use crate::models::{new_id, Availability, Offering};
use crate::store::{keys, Records};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOffering {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOffering {
    pub offering_id: Option<String>,
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub base_price: Option<f64>,
    pub availability: Option<Availability>,
}

/// Offerings of one user, or of everyone when `user_id` is absent
pub async fn list_offerings(
    records: &Records,
    user_id: Option<String>,
) -> Result<Vec<Offering>, ApiError> {
    let prefix = match present(user_id) {
        Some(user_id) => keys::offerings_of(&user_id),
        None => keys::OFFERING_PREFIX.to_string(),
    };
    records
        .scan(&prefix)
        .await
        .map_err(ApiError::store("Failed to fetch offerings"))
}

pub async fn create_offering(records: &Records, req: CreateOffering) -> Result<Offering, ApiError> {
    let (Some(user_id), Some(title), Some(description), Some(base_price)) = (
        present(req.user_id),
        present(req.title),
        present(req.description),
        nonzero(req.base_price),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let now = Utc::now();
    let offering = Offering {
        offering_id: new_id(),
        user_id,
        title,
        description,
        skills: req.skills.unwrap_or_default(),
        base_price,
        availability: Availability::Available,
        created_at: now,
        updated_at: now,
    };

    records
        .put(
            &keys::offering(&offering.user_id, &offering.offering_id),
            &offering,
        )
        .await
        .map_err(ApiError::store("Failed to create offering"))?;
    Ok(offering)
}

fn require_ids(
    offering_id: Option<String>,
    user_id: Option<String>,
) -> Result<(String, String), ApiError> {
    match (present(offering_id), present(user_id)) {
        (Some(offering_id), Some(user_id)) => Ok((offering_id, user_id)),
        _ => Err(ApiError::bad_request("offeringId and userId required")),
    }
}

pub async fn update_offering(records: &Records, req: UpdateOffering) -> Result<Offering, ApiError> {
    let (offering_id, user_id) = require_ids(req.offering_id, req.user_id)?;
    let key = keys::offering(&user_id, &offering_id);

    let mut offering: Offering = records
        .get(&key)
        .await
        .map_err(ApiError::store("Failed to update offering"))?
        .ok_or(ApiError::NotFound("Offering not found"))?;

    if let Some(title) = present(req.title) {
        offering.title = title;
    }
    if let Some(description) = present(req.description) {
        offering.description = description;
    }
    if let Some(skills) = req.skills {
        offering.skills = skills;
    }
    if let Some(base_price) = req.base_price {
        offering.base_price = base_price;
    }
    if let Some(availability) = req.availability {
        offering.availability = availability;
    }
    offering.updated_at = Utc::now();

    records
        .put(&key, &offering)
        .await
        .map_err(ApiError::store("Failed to update offering"))?;
    Ok(offering)
}

pub async fn delete_offering(
    records: &Records,
    offering_id: Option<String>,
    user_id: Option<String>,
) -> Result<(), ApiError> {
    let (offering_id, user_id) = require_ids(offering_id, user_id)?;
    let key = keys::offering(&user_id, &offering_id);

    let exists = records
        .exists(&key)
        .await
        .map_err(ApiError::store("Failed to delete offering"))?;
    if !exists {
        return Err(ApiError::NotFound("Offering not found"));
    }

    records
        .remove(&key)
        .await
        .map_err(ApiError::store("Failed to delete offering"))?;
    Ok(())
}
