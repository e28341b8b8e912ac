// API module entry
// Request entry point, route table and dispatch for the marketplace API

mod handlers;
mod response;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

const READ_WRITE: &str = "GET, POST, PUT, OPTIONS";
const READ_WRITE_DELETE: &str = "GET, POST, PUT, DELETE, OPTIONS";
const READ_ONLY: &str = "GET, OPTIONS";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let max_body_size = state.config.http.max_body_size;

    let mut response = if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        resp
    } else {
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        match Limited::new(body, limit).collect().await {
            Ok(collected) => {
                dispatch(
                    &state,
                    &parts.method,
                    parts.uri.path(),
                    parts.uri.query(),
                    collected.to_bytes(),
                )
                .await
            }
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                logger::log_error(&format!("Request body exceeded {max_body_size} bytes"));
                http::build_413_response()
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                http::error_response(StatusCode::BAD_REQUEST, "Failed to read request body")
            }
        }
    };

    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = http_version(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = body_len(&response);
        entry.referer = header_string(&parts.headers, REFERER);
        entry.user_agent = header_string(&parts.headers, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a fully read request to its handler
///
/// OPTIONS is answered for every path. A known path with another method gets
/// 405, an unknown path 404.
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    let result = match (method.clone(), path) {
        (Method::GET, "/healthz") => Ok(http::build_health_response(true)),
        (Method::GET, "/readyz") => handlers::readiness(state).await,

        (Method::GET, "/api/users") => handlers::get_user(state, query).await,
        (Method::POST, "/api/users") => handlers::create_user(state, &body).await,
        (Method::PUT, "/api/users") => handlers::update_user(state, &body).await,

        (Method::GET, "/api/gigs") => handlers::list_gigs(state, query).await,
        (Method::POST, "/api/gigs") => handlers::create_gig(state, &body).await,
        (Method::PUT, "/api/gigs") => handlers::update_gig(state, &body).await,

        (Method::GET, "/api/offerings") => handlers::list_offerings(state, query).await,
        (Method::POST, "/api/offerings") => handlers::create_offering(state, &body).await,
        (Method::PUT, "/api/offerings") => handlers::update_offering(state, &body).await,
        (Method::DELETE, "/api/offerings") => handlers::delete_offering(state, query).await,

        (Method::GET, "/api/transactions") => handlers::list_transactions(state, query).await,
        (Method::POST, "/api/transactions") => handlers::create_transaction(state, &body).await,
        (Method::PUT, "/api/transactions") => handlers::complete_transaction(state, &body).await,
        (Method::GET, "/api/transactions/payout") => handlers::payout(state, query).await,

        (Method::GET, "/api/insights/earnings") => handlers::earnings(state, query).await,
        (Method::GET, "/api/insights/performance") => handlers::performance(state, query).await,
        (Method::GET, "/api/insights/activity") => handlers::activity(state, query).await,

        _ => Ok(allowed_methods(path).map_or_else(http::build_404_response, |allow| {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(allow)
        })),
    };

    let response = result.unwrap_or_else(|err| response::from_error(&err));
    logger::log_api_request(method.as_str(), path, response.status().as_u16());
    response
}

/// Methods served on a known path
fn allowed_methods(path: &str) -> Option<&'static str> {
    match path {
        "/api/users" | "/api/gigs" | "/api/transactions" => Some(READ_WRITE),
        "/api/offerings" => Some(READ_WRITE_DELETE),
        "/api/transactions/payout"
        | "/api/insights/earnings"
        | "/api/insights/performance"
        | "/api/insights/activity"
        | "/healthz"
        | "/readyz" => Some(READ_ONLY),
        _ => None,
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn body_len(response: &Response<Full<Bytes>>) -> usize {
    use hyper::body::Body;
    response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Records;
    use serde_json::{json, Value};

    fn test_state() -> AppState {
        let config = Config::load_from("does-not-exist").unwrap();
        AppState::new(config, Records::in_memory())
    }

    async fn call(
        state: &AppState,
        method: Method,
        target: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let body = if body.is_null() {
            Bytes::new()
        } else {
            Bytes::from(body.to_string())
        };
        let resp = dispatch(state, &method, path, query, body).await;
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let state = test_state();

        let (status, body) = call(&state, Method::GET, "/api/users?userId=alice", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/users",
            json!({ "userId": "alice", "walletAddress": "0xabc", "skills": ["rust"] }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["walletAddress"], "0xabc");

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/users",
            json!({ "userId": "alice", "farcasterId": "42", "farcasterUsername": "alice.eth" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["farcasterUsername"], "alice.eth");
        assert_eq!(body["skills"], json!(["rust"]));

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/users",
            json!({ "userId": "alice", "farcasterId": 4242 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["farcasterId"], "4242");

        let (status, body) = call(&state, Method::GET, "/api/users", Value::Null).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "userId required" }));
    }

    #[tokio::test]
    async fn test_gig_requires_payout() {
        let state = test_state();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/gigs",
            json!({ "title": "Logo", "description": "SVG logo", "postedByUserId": "bob" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_gig_completion_flow() {
        let state = test_state();
        let (status, gig) = call(
            &state,
            Method::POST,
            "/api/gigs",
            json!({
                "title": "Logo",
                "description": "SVG logo",
                "payoutAmount": 100,
                "postedByUserId": "bob",
                "skillsRequired": ["design"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(gig["status"], "open");
        let gig_id = gig["gigId"].as_str().unwrap().to_string();

        let (status, updated) = call(
            &state,
            Method::PUT,
            "/api/gigs",
            json!({ "gigId": gig_id, "status": "completed", "completedByUserId": "alice" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "completed");
        assert!(updated["completedAt"].is_string());
        assert!(updated["updatedAt"].is_string());

        let (_, open) = call(&state, Method::GET, "/api/gigs?status=open", Value::Null).await;
        assert_eq!(open, json!([]));

        let (status, earnings) = call(
            &state,
            Method::GET,
            "/api/insights/earnings?userId=alice",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(earnings["completedGigs"], 1);
        assert_eq!(earnings["totalEarnings"], 100.0);

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/gigs",
            json!({ "gigId": "missing", "status": "accepted" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Gig not found");
    }

    #[tokio::test]
    async fn test_offering_delete() {
        let state = test_state();
        let (_, offering) = call(
            &state,
            Method::POST,
            "/api/offerings",
            json!({
                "userId": "alice",
                "title": "Rust review",
                "description": "Code review",
                "basePrice": 50
            }),
        )
        .await;
        let target = format!(
            "/api/offerings?offeringId={}&userId=alice",
            offering["offeringId"].as_str().unwrap()
        );

        let (status, body) = call(&state, Method::DELETE, &target, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Offering deleted successfully");

        let (status, body) = call(&state, Method::DELETE, &target, Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Offering not found");
    }

    #[tokio::test]
    async fn test_transaction_payout() {
        let state = test_state();
        call(
            &state,
            Method::POST,
            "/api/users",
            json!({ "userId": "alice", "walletAddress": "0x1111" }),
        )
        .await;
        let (status, tx) = call(
            &state,
            Method::POST,
            "/api/transactions",
            json!({ "gigId": "g1", "fromUserId": "bob", "toUserId": "alice", "amount": 100 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tx["status"], "pending");
        assert_eq!(tx["commission"], 2.5);

        let target = format!(
            "/api/transactions/payout?transactionId={}",
            tx["transactionId"].as_str().unwrap()
        );
        let (status, payout) = call(&state, Method::GET, &target, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payout["to"], "0x1111");
        assert_eq!(payout["value"], "97500000000000000000");

        let (status, listed) =
            call(&state, Method::GET, "/api/transactions?userId=bob", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let state = test_state();
        let resp = dispatch(
            &state,
            &Method::POST,
            "/api/gigs",
            None,
            Bytes::from_static(b"{\"title\":"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_method_and_path_fallbacks() {
        let state = test_state();

        let (status, _) = call(&state, Method::DELETE, "/api/gigs", Value::Null).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = call(&state, Method::GET, "/api/nope", Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");

        let (status, body) = call(&state, Method::OPTIONS, "/api/gigs", Value::Null).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = call(&state, Method::GET, "/readyz", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[test]
    fn test_check_body_size() {
        let mut headers = HeaderMap::new();
        assert!(check_body_size(&headers, 10).is_none());
        headers.insert(CONTENT_LENGTH, "11".parse().unwrap());
        let resp = check_body_size(&headers, 10).unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        headers.insert(CONTENT_LENGTH, "10".parse().unwrap());
        assert!(check_body_size(&headers, 10).is_none());
    }
}
