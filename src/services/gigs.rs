// Gig lifecycle operations

use chrono::Utc;
use serde::Deserialize;

use super::{nonzero, present};
use crate::error::ApiError;
use crate::models::{new_id, Gig, GigStatus};
use crate::store::{keys, Records};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills_required: Option<Vec<String>>,
    /// Legacy name for `skillsRequired`
    pub skills: Option<Vec<String>>,
    pub payout_amount: Option<f64>,
    pub posted_by_user_id: Option<String>,
    /// Legacy name for `postedByUserId`
    pub created_by_user_id: Option<String>,
}

/// Status transition or assignment for an existing gig
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGig {
    pub gig_id: Option<String>,
    pub status: Option<GigStatus>,
    pub completed_by_user_id: Option<String>,
}

/// Every stored gig, optionally narrowed to one status
pub async fn list_gigs(records: &Records, status: Option<GigStatus>) -> Result<Vec<Gig>, ApiError> {
    let gigs: Vec<Gig> = records
        .scan(keys::GIG_PREFIX)
        .await
        .map_err(ApiError::store("Failed to fetch gigs"))?;

    Ok(match status {
        Some(status) => gigs.into_iter().filter(|g| g.status == status).collect(),
        None => gigs,
    })
}

pub async fn create_gig(records: &Records, req: CreateGig) -> Result<Gig, ApiError> {
    let (Some(title), Some(description), Some(payout_amount), Some(posted_by_user_id)) = (
        present(req.title),
        present(req.description),
        nonzero(req.payout_amount),
        present(req.posted_by_user_id).or_else(|| present(req.created_by_user_id)),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let gig = Gig {
        gig_id: new_id(),
        title,
        description,
        skills_required: req.skills_required.or(req.skills).unwrap_or_default(),
        payout_amount,
        status: GigStatus::Open,
        posted_by_user_id,
        completed_by_user_id: None,
        created_at: Utc::now(),
        updated_at: None,
        completed_at: None,
    };

    records
        .put(&keys::gig(&gig.gig_id), &gig)
        .await
        .map_err(ApiError::store("Failed to create gig"))?;
    Ok(gig)
}

/// Merge a status change into the stored gig
///
/// Moving to `completed` stamps `completedAt`; any other update keeps it.
pub async fn update_gig(records: &Records, req: UpdateGig) -> Result<Gig, ApiError> {
    let gig_id = present(req.gig_id).ok_or_else(|| ApiError::bad_request("gigId required"))?;
    let key = keys::gig(&gig_id);

    let mut gig: Gig = records
        .get(&key)
        .await
        .map_err(ApiError::store("Failed to update gig"))?
        .ok_or(ApiError::NotFound("Gig not found"))?;

    let now = Utc::now();
    if let Some(status) = req.status {
        gig.status = status;
        if status == GigStatus::Completed {
            gig.completed_at = Some(now);
        }
    }
    if let Some(worker) = present(req.completed_by_user_id) {
        gig.completed_by_user_id = Some(worker);
    }
    gig.updated_at = Some(now);

    records
        .put(&key, &gig)
        .await
        .map_err(ApiError::store("Failed to update gig"))?;
    Ok(gig)
}
