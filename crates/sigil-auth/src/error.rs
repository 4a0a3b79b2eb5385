//! Authentication error types
//!
//! Error handling for all token and credential operations. Errors are
//! designed to be:
//! - Informative for logging/debugging
//! - Safe for external exposure (no sensitive data leakage)
//! - Convertible to HTTP status codes
//!
//! Every token-class failure collapses to the same client message so the
//! response body never reveals whether a signature, expiry, algorithm, or
//! token-type check failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors
    // =========================================================================
    /// No bearer token was presented
    #[error("Authentication required")]
    MissingToken,

    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Token type mismatch (expected access, got refresh, etc.)
    #[error("Invalid token type")]
    InvalidTokenType,

    /// Token header declares a different algorithm than the verifier is
    /// pinned to
    #[error("Token algorithm mismatch")]
    AlgorithmMismatch,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Invalid credentials (email/password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    /// Configuration error (missing or undecodable key material)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidTokenType
            | Self::AlgorithmMismatch
            | Self::InvalidCredentials => 401,

            // 500 Internal Server Error
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidTokenType
            | Self::AlgorithmMismatch => "INVALID_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    ///
    /// All token failures share one message so a caller probing the service
    /// cannot distinguish a bad signature from an expired or mistyped token.
    pub fn client_message(&self) -> String {
        match self {
            Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidTokenType
            | Self::AlgorithmMismatch => "Invalid or expired token".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Error response body for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message (human-readable, safe to expose)
    pub error: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.client_message(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidAlgorithm => Self::AlgorithmMismatch,
            _ => Self::InvalidToken,
        }
    }
}

impl From<password_hash::Error> for AuthError {
    fn from(err: password_hash::Error) -> Self {
        match err {
            password_hash::Error::Password => Self::InvalidCredentials,
            _ => Self::PasswordHashingFailed,
        }
    }
}
