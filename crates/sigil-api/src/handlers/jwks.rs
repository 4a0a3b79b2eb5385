//! Public-key export handler

use axum::{extract::State, Json};
use jsonwebtoken::jwk::JwkSet;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /.well-known/jwks.json`
///
/// RFC 7517 JWK Set for the configured asymmetric public keys. The HS256
/// secret is never exported; with only HS256 configured the set is empty.
pub async fn jwks(State(state): State<Arc<AppState>>) -> ApiResult<Json<JwkSet>> {
    let set = state.auth.jwk_set()?;
    Ok(Json(set))
}
