//! JWT authentication flow handlers
//!
//! One factory produces the four flows (login, refresh, verify, protected)
//! for each algorithm, so the flows are written once and every algorithm
//! gets identical behavior. Gated routes carry a [`BearerAuthLayer`] pinned
//! to the algorithm's own token service and required token type.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use sigil_auth::{Algorithm, BearerAuthLayer, VerifiedClaims};

use crate::dto::{
    LoginRequest, ProtectedData, ProtectedResponse, TokenPairResponse, UserInfo, VerifyResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the four auth routes for one algorithm
///
/// When the algorithm has no key material, the same paths are still
/// mounted but answer with the configuration fault; absent keys are a
/// deployment problem, not an unknown route or a bad token.
pub fn algorithm_routes(algorithm: Algorithm, state: &AppState) -> Router<Arc<AppState>> {
    let tokens = match state.auth.token_service(algorithm) {
        Ok(tokens) => tokens,
        Err(_) => {
            return Router::new()
                .route("/login", post(move || unconfigured(algorithm)))
                .route("/refresh", post(move || unconfigured(algorithm)))
                .route("/verify", get(move || unconfigured(algorithm)))
                .route("/protected", get(move || unconfigured(algorithm)));
        }
    };

    Router::new()
        .route(
            "/login",
            post(move |state: State<Arc<AppState>>, json: Json<LoginRequest>| {
                login(algorithm, state, json)
            }),
        )
        .route(
            "/refresh",
            post(move |state: State<Arc<AppState>>, claims: VerifiedClaims| {
                refresh(algorithm, state, claims)
            })
            .layer(BearerAuthLayer::refresh(tokens.clone())),
        )
        .route(
            "/verify",
            get(move |claims: VerifiedClaims| verify(algorithm, claims))
                .layer(BearerAuthLayer::access(tokens.clone())),
        )
        .route(
            "/protected",
            get(move |claims: VerifiedClaims| protected(algorithm, claims))
                .layer(BearerAuthLayer::access(tokens)),
        )
}

async fn unconfigured(algorithm: Algorithm) -> ApiError {
    ApiError::Internal(format!("no key material configured for {algorithm}"))
}

/// `POST /auth/{alg}/login`
///
/// Plaintext comparison against the single configured identity; a match
/// issues a fresh token pair under this algorithm.
async fn login(
    algorithm: Algorithm,
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    state.auth.check_login(&request.email, &request.password)?;

    let tokens = state.auth.token_service(algorithm)?;
    let identity = &state.auth.config().test_identity;
    let pair = tokens.generate_token_pair(&identity.user_id, &identity.email)?;

    tracing::info!(algorithm = %algorithm, email = %identity.email, "login succeeded");

    Ok(Json(TokenPairResponse {
        message: "Login successful".to_string(),
        algorithm: algorithm.tag().to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: tokens.access_lifetime_secs(),
    }))
}

/// `POST /auth/{alg}/refresh`
///
/// Requires a refresh-type bearer; issues a new pair for the same subject.
/// Rotation is stateless: the presented refresh token stays valid until
/// its own expiry.
async fn refresh(
    algorithm: Algorithm,
    State(state): State<Arc<AppState>>,
    VerifiedClaims(claims): VerifiedClaims,
) -> ApiResult<Json<TokenPairResponse>> {
    let tokens = state.auth.token_service(algorithm)?;
    let pair = tokens.generate_token_pair(&claims.sub, &claims.email)?;

    tracing::info!(algorithm = %algorithm, user_id = %claims.sub, "tokens refreshed");

    Ok(Json(TokenPairResponse {
        message: "Token refreshed".to_string(),
        algorithm: algorithm.tag().to_string(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: tokens.access_lifetime_secs(),
    }))
}

/// `GET /auth/{alg}/verify`
///
/// Requires an access-type bearer; echoes the verified claims.
async fn verify(algorithm: Algorithm, VerifiedClaims(claims): VerifiedClaims) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        algorithm: algorithm.tag().to_string(),
        payload: claims,
    })
}

/// `GET /auth/{alg}/protected`
///
/// Requires an access-type bearer; returns the gated demo payload.
async fn protected(
    algorithm: Algorithm,
    VerifiedClaims(claims): VerifiedClaims,
) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: format!("You have accessed a protected {} route", algorithm.jwa_name()),
        algorithm: algorithm.tag().to_string(),
        user: UserInfo {
            id: claims.sub,
            email: claims.email,
        },
        data: ProtectedData {
            secret_info: "This data requires a valid access token".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        },
    })
}
