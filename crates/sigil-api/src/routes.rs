//! Route definitions

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use sigil_auth::Algorithm;

use crate::handlers;
use crate::state::AppState;

/// Authentication routes: per-algorithm JWT flows + password flows
pub fn auth_routes(state: &AppState) -> Router<Arc<AppState>> {
    let mut router = Router::new()
        .route("/password/login", post(handlers::password::login))
        .route("/password/hash", post(handlers::password::hash))
        .route("/password/benchmark", post(handlers::password::benchmark));

    for algorithm in Algorithm::ALL {
        router = router.nest(
            &format!("/{}", algorithm.tag()),
            handlers::auth::algorithm_routes(algorithm, state),
        );
    }

    router
}

/// Request-log routes, gated behind any configured algorithm's access token
pub fn log_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::logs::list))
        .route("/stats", get(handlers::logs::stats))
        .layer(middleware::from_fn_with_state(
            state,
            handlers::logs::require_any_access,
        ))
}
