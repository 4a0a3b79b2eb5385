//! API error handling
//!
//! HTTP-boundary errors with uniform, non-leaking bodies. Token-class
//! failures collapse to one 401 message; configuration and internal faults
//! log their detail and answer with a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sigil_auth::AuthError;
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bearer token missing, invalid, expired, mistyped, or mis-algorithmed
    #[error("Invalid or expired token")]
    Unauthorized,

    /// Login credentials rejected
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed request body
    #[error("Invalid request body")]
    InvalidRequestBody,

    /// Unknown route; the path is echoed back
    #[error("Not found")]
    NotFound(String),

    /// Internal fault (detail stays in the logs)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidRequestBody => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message
    pub fn client_message(&self) -> String {
        match self {
            Self::Unauthorized => "Invalid or expired token".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::InvalidRequestBody => "Invalid request body".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message (safe to expose)
    pub error: String,
    /// Echoed request path, for unknown-route responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let path = match err {
            ApiError::NotFound(path) => Some(path.clone()),
            _ => None,
        };
        Self {
            error: err.client_message(),
            path,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal error");
        }
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::InvalidTokenType
            | AuthError::AlgorithmMismatch => Self::Unauthorized,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::PasswordHashingFailed => Self::Internal("password hashing failed".to_string()),
            AuthError::Config(detail) | AuthError::Internal(detail) => Self::Internal(detail),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidRequestBody
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("/nope".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_collapse() {
        for err in [
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::InvalidToken,
            AuthError::InvalidTokenType,
            AuthError::AlgorithmMismatch,
        ] {
            assert!(matches!(ApiError::from(err), ApiError::Unauthorized));
        }
        assert!(matches!(
            ApiError::from(AuthError::Config("no keys".to_string())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::Internal("rs256 key file unreadable".to_string());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "An internal error occurred");
    }

    #[test]
    fn test_not_found_echoes_path() {
        let body = ErrorResponse::from(&ApiError::NotFound("/missing".to_string()));
        assert_eq!(body.path.as_deref(), Some("/missing"));
    }
}
