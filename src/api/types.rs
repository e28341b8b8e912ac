// Query string types and request body decoding

use hyper::body::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::GigStatus;

/// `?userId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// `?status=` on the gig listing
#[derive(Debug, Default, Deserialize)]
pub struct GigQuery {
    pub status: Option<GigStatus>,
}

/// `?offeringId=&userId=` on offering deletion
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingQuery {
    pub offering_id: Option<String>,
    pub user_id: Option<String>,
}

/// `?transactionId=` on payout lookup
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutQuery {
    pub transaction_id: Option<String>,
}

pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON: {e}")))
}

/// Decode a query string; a missing query yields all-`None` fields
pub fn parse_query<T: DeserializeOwned>(query: Option<&str>) -> Result<T, ApiError> {
    serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| ApiError::bad_request(format!("Invalid query: {e}")))
}
