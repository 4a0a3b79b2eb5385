//! Request logging middleware
//!
//! Outermost application middleware: times the request, reads the
//! authentication context the bearer layers attach to the response, and
//! hands one entry to the fire-and-forget recorder. Recording never blocks
//! or fails the request.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use sigil_audit::RequestLogEntry;
use sigil_auth::AuthContext;

use crate::state::AppState;

/// Record one entry per completed request
pub async fn record_request(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let client_ip = client_ip(req.headers());
    let user_agent = header_value(req.headers(), http::header::USER_AGENT.as_str());

    let response = next.run(req).await;

    let status = response.status();
    let context = response.extensions().get::<AuthContext>();
    let error = if status.is_client_error() || status.is_server_error() {
        status.canonical_reason().map(String::from)
    } else {
        None
    };

    state.recorder.record(RequestLogEntry {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        method,
        path,
        status: status.as_u16(),
        latency_ms: start.elapsed().as_millis() as u64,
        user_id: context.map(|c| c.user_id.clone()),
        algorithm: context.map(|c| c.algorithm.tag().to_string()),
        token_type: context.map(|c| c.token_type.to_string()),
        client_ip,
        user_agent,
        error,
    });

    response
}

/// Client IP from forwarding headers
///
/// `X-Forwarded-For` may carry a comma-separated chain; the first hop is
/// the client.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = header_value(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    header_value(headers, "x-real-ip")
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_chain_head() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_client_ip_absent() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
