//! Hashed-credential handlers
//!
//! PBKDF2 flows backed by the credential store. The login flow registers an
//! account on first sight of an email; subsequent logins verify against the
//! stored hash.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::{
    BenchmarkRequest, BenchmarkResponse, HashRequest, HashResponse, PasswordLoginRequest,
    PasswordLoginResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /auth/password/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordLoginRequest>,
) -> ApiResult<Json<PasswordLoginResponse>> {
    // Hash the candidate up front so a first-seen email registers with it
    let candidate_hash = state.auth.password.hash_password(&request.password)?;
    let (stored_hash, registered) = state
        .auth
        .credentials
        .get_or_create(&request.email, &candidate_hash)
        .await?;

    if !registered {
        state
            .auth
            .password
            .verify_password(&request.password, &stored_hash)?;
    }

    let message = if registered {
        tracing::info!(email = %request.email, "account registered");
        "Account registered and logged in"
    } else {
        tracing::info!(email = %request.email, "password login succeeded");
        "Login successful"
    };

    Ok(Json(PasswordLoginResponse {
        message: message.to_string(),
        email: request.email,
        registered,
    }))
}

/// `POST /auth/password/hash`
pub async fn hash(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HashRequest>,
) -> ApiResult<Json<HashResponse>> {
    let timing = state
        .auth
        .password
        .benchmark(&request.password, request.iterations)?;

    Ok(Json(HashResponse {
        hash: timing.hash,
        iterations: timing.iterations,
    }))
}

/// `POST /auth/password/benchmark`
///
/// Times one hash at the requested cost (clamped to the service cap).
pub async fn benchmark(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BenchmarkRequest>,
) -> ApiResult<Json<BenchmarkResponse>> {
    let timing = state
        .auth
        .password
        .benchmark(&request.password, request.iterations)?;

    Ok(Json(BenchmarkResponse {
        iterations: timing.iterations,
        elapsed_ms: timing.elapsed_ms,
    }))
}
