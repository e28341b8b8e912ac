// Marketplace resource handlers
//
// Each handler decodes its input, calls into `services`, and picks the status.

use hyper::body::Bytes;
use serde_json::json;

use super::response::{created, ok, ApiResult};
use super::types::{parse_json, parse_query, GigQuery, OfferingQuery, PayoutQuery, UserQuery};
use crate::config::AppState;
use crate::services::{gigs, insights, offerings, transactions, users};

// ---- users ----

pub async fn get_user(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&users::get_user(&state.records, q.user_id).await?)
}

pub async fn create_user(state: &AppState, body: &Bytes) -> ApiResult {
    created(&users::create_user(&state.records, parse_json(body)?).await?)
}

pub async fn update_user(state: &AppState, body: &Bytes) -> ApiResult {
    ok(&users::update_user(&state.records, parse_json(body)?).await?)
}

// ---- gigs ----

pub async fn list_gigs(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: GigQuery = parse_query(query)?;
    ok(&gigs::list_gigs(&state.records, q.status).await?)
}

pub async fn create_gig(state: &AppState, body: &Bytes) -> ApiResult {
    created(&gigs::create_gig(&state.records, parse_json(body)?).await?)
}

pub async fn update_gig(state: &AppState, body: &Bytes) -> ApiResult {
    ok(&gigs::update_gig(&state.records, parse_json(body)?).await?)
}

// ---- offerings ----

pub async fn list_offerings(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&offerings::list_offerings(&state.records, q.user_id).await?)
}

pub async fn create_offering(state: &AppState, body: &Bytes) -> ApiResult {
    created(&offerings::create_offering(&state.records, parse_json(body)?).await?)
}

pub async fn update_offering(state: &AppState, body: &Bytes) -> ApiResult {
    ok(&offerings::update_offering(&state.records, parse_json(body)?).await?)
}

pub async fn delete_offering(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: OfferingQuery = parse_query(query)?;
    offerings::delete_offering(&state.records, q.offering_id, q.user_id).await?;
    ok(&json!({ "message": "Offering deleted successfully" }))
}

// ---- transactions ----

pub async fn list_transactions(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&transactions::list_for_user(&state.records, q.user_id).await?)
}

pub async fn create_transaction(state: &AppState, body: &Bytes) -> ApiResult {
    let rate = state.commission_rate();
    let transaction =
        transactions::create_transaction(&state.records, parse_json(body)?, rate).await?;
    created(&transaction)
}

pub async fn complete_transaction(state: &AppState, body: &Bytes) -> ApiResult {
    ok(&transactions::complete_transaction(&state.records, parse_json(body)?).await?)
}

pub async fn payout(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: PayoutQuery = parse_query(query)?;
    let rate = state.commission_rate();
    ok(&transactions::payout_params(&state.records, q.transaction_id, rate).await?)
}

// ---- insights ----

pub async fn earnings(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&insights::earnings(&state.records, q.user_id).await?)
}

pub async fn performance(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&insights::performance(&state.records, q.user_id).await?)
}

pub async fn activity(state: &AppState, query: Option<&str>) -> ApiResult {
    let q: UserQuery = parse_query(query)?;
    ok(&insights::activity(&state.records, q.user_id).await?)
}

// ---- probes ----

/// Readiness: the store must answer a point read
pub async fn readiness(state: &AppState) -> ApiResult {
    let healthy = state.records.exists("readyz").await.is_ok();
    if !healthy {
        crate::logger::log_warning("Readiness probe failed: store unavailable");
    }
    Ok(crate::http::build_health_response(healthy))
}
