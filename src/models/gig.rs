use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GigStatus {
    Open,
    Accepted,
    InProgress,
    Completed,
}

/// A paid task, keyed by `gig:{gigId}`
///
/// Older documents used `skills` and `createdByUserId`, sometimes next to the
/// canonical keys. Reads prefer the canonical key; writes only use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGig")]
pub struct Gig {
    pub gig_id: String,
    pub title: String,
    pub description: String,
    pub skills_required: Vec<String>,
    pub payout_amount: f64,
    pub status: GigStatus,
    pub posted_by_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Stored gig document as written by any client version
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGig {
    gig_id: String,
    title: String,
    description: String,
    skills_required: Option<Vec<String>>,
    skills: Option<Vec<String>>,
    payout_amount: f64,
    status: GigStatus,
    posted_by_user_id: Option<String>,
    created_by_user_id: Option<String>,
    completed_by_user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawGig> for Gig {
    type Error = String;

    fn try_from(raw: RawGig) -> Result<Self, Self::Error> {
        let posted_by_user_id = raw
            .posted_by_user_id
            .or(raw.created_by_user_id)
            .ok_or_else(|| "missing field `postedByUserId`".to_string())?;

        Ok(Self {
            gig_id: raw.gig_id,
            title: raw.title,
            description: raw.description,
            skills_required: raw.skills_required.or(raw.skills).unwrap_or_default(),
            payout_amount: raw.payout_amount,
            status: raw.status,
            posted_by_user_id,
            completed_by_user_id: raw.completed_by_user_id,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            completed_at: raw.completed_at,
        })
    }
}

impl Gig {
    /// Whether `user_id` finished this gig
    pub fn is_completed_by(&self, user_id: &str) -> bool {
        self.status == GigStatus::Completed && self.completed_by_user_id.as_deref() == Some(user_id)
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.completed_by_user_id.as_deref() == Some(user_id)
    }

    /// Most recent modification time, falling back to creation
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_field_names_are_accepted() {
        let json = r#"{
            "gigId": "g1",
            "title": "Logo",
            "description": "Design a logo",
            "skills": ["design"],
            "payoutAmount": 50,
            "status": "in-progress",
            "createdByUserId": "0xposter",
            "completedByUserId": "0xworker",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let gig: Gig = serde_json::from_str(json).unwrap();
        assert_eq!(gig.skills_required, vec!["design"]);
        assert_eq!(gig.posted_by_user_id, "0xposter");
        assert_eq!(gig.status, GigStatus::InProgress);
        assert!(gig.is_assigned_to("0xworker"));
        assert!(!gig.is_completed_by("0xworker"));

        let written = serde_json::to_value(&gig).unwrap();
        assert_eq!(written["skillsRequired"][0], "design");
        assert_eq!(written["postedByUserId"], "0xposter");
        assert!(written.get("completedAt").is_none());
    }

    #[test]
    fn test_canonical_and_legacy_keys_together() {
        let json = r#"{
            "gigId": "g2",
            "title": "Audit",
            "description": "Review a contract",
            "skills": ["legacy"],
            "skillsRequired": ["solidity"],
            "payoutAmount": 300,
            "status": "open",
            "postedByUserId": "0xnew",
            "createdByUserId": "0xold",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let gig: Gig = serde_json::from_str(json).unwrap();
        assert_eq!(gig.skills_required, vec!["solidity"]);
        assert_eq!(gig.posted_by_user_id, "0xnew");

        let written = serde_json::to_value(&gig).unwrap();
        assert!(written.get("skills").is_none());
        assert!(written.get("createdByUserId").is_none());
    }

    #[test]
    fn test_poster_is_required() {
        let json = r#"{
            "gigId": "g3",
            "title": "Audit",
            "description": "Review a contract",
            "payoutAmount": 300,
            "status": "open",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let err = serde_json::from_str::<Gig>(json).unwrap_err();
        assert!(err.to_string().contains("postedByUserId"));
    }
}
