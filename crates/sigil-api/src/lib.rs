//! Sigil REST API
//!
//! HTTP surface for the multi-algorithm JWT auth service.
//!
//! # API Structure
//!
//! ```text
//! /auth/{hs256,rs256,es256}/
//! ├── POST /login       - credentials -> token pair
//! ├── POST /refresh     - refresh bearer -> new pair
//! ├── GET  /verify      - access bearer -> claims echo
//! └── GET  /protected   - access bearer -> gated payload
//! /auth/password/
//! ├── POST /login       - PBKDF2 credential flow (first login registers)
//! ├── POST /hash        - hash a password
//! └── POST /benchmark   - time one hash
//! /.well-known/jwks.json - asymmetric public keys
//! /logs, /logs/stats     - request log (access token required)
//! /health                - liveness
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;

use axum::http::HeaderName;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Create the application router with all middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .nest("/auth", routes::auth_routes(&state))
        .route("/.well-known/jwks.json", get(handlers::jwks::jwks))
        .nest("/logs", routes::log_routes(state.clone()))
        .route("/health", get(handlers::health::health))
        .fallback(handlers::not_found)
        // Request logging sits inside the transport layers so it sees the
        // final status and the auth context the bearer layers attach
        .layer(middleware::from_fn_with_state(
            state.clone(),
            logging::record_request,
        ))
        .with_state(state);

    let x_request_id = HeaderName::from_static("x-request-id");
    router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(CorsLayer::permissive())
}
