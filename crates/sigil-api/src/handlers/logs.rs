//! Request-log inspection handlers
//!
//! Both endpoints sit behind [`require_any_access`]: the caller must
//! present a valid access token under one of the configured algorithms.
//! Each candidate verification stays pinned to its own (algorithm, key)
//! pair.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;

use sigil_audit::LogStats;
use sigil_auth::{
    middleware::{auth_error_response, extract_bearer},
    AuthContext, TokenType,
};

use crate::dto::{LogsQuery, LogsResponse};
use crate::state::AppState;

/// Default page size for `GET /logs`
const DEFAULT_LOG_LIMIT: usize = 100;

/// Gate: accept an access token from any configured algorithm
pub async fn require_any_access(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let verified = extract_bearer(req.headers())
        .and_then(|token| state.auth.verify_any_access(token));

    let (algorithm, claims) = match verified {
        Ok(verified) => verified,
        Err(e) => {
            tracing::debug!(error = %e, "log access denied");
            return auth_error_response(e);
        }
    };

    let context = AuthContext {
        user_id: claims.sub.clone(),
        algorithm,
        token_type: TokenType::Access,
    };

    let (mut parts, body) = req.into_parts();
    parts.extensions.insert(claims);
    let req = Request::from_parts(parts, body);

    let mut response = next.run(req).await;
    response.extensions_mut().insert(context);
    response
}

/// `GET /logs`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let logs = state.logs.recent(limit).await;
    Json(LogsResponse {
        count: logs.len(),
        logs,
    })
}

/// `GET /logs/stats`
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<LogStats> {
    Json(state.logs.stats().await)
}
