//! Request handlers

pub mod auth;
pub mod health;
pub mod jwks;
pub mod logs;
pub mod password;

use axum::http::{StatusCode, Uri};
use axum::Json;

use crate::error::{ApiError, ErrorResponse};

/// Fallback for unknown routes: 404 echoing the requested path
pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    let err = ApiError::NotFound(uri.path().to_string());
    (StatusCode::NOT_FOUND, Json(ErrorResponse::from(&err)))
}
