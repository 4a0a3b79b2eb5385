//! Core token types
//!
//! Shared claim and token-pair types used across the signing, verification,
//! and middleware layers.

use serde::{Deserialize, Serialize};

/// Token type enum for JWT claims
///
/// Wire representation is lowercase (`"access"` / `"refresh"`) under the
/// claim name `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Token type (access or refresh)
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// JWT token pair (access + refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token expiry (Unix timestamp)
    pub access_expires_at: i64,
    /// Refresh token expiry (Unix timestamp)
    pub refresh_expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_wire_names() {
        assert_eq!(serde_json::to_string(&TokenType::Access).unwrap(), "\"access\"");
        assert_eq!(serde_json::to_string(&TokenType::Refresh).unwrap(), "\"refresh\"");
    }

    #[test]
    fn test_claims_serialize_type_field() {
        let claims = TokenClaims {
            sub: "1".to_string(),
            email: "test@example.com".to_string(),
            token_type: TokenType::Access,
            iat: 1_700_000_000,
            exp: 1_700_000_900,
        };

        let json: serde_json::Value = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "access");
        assert_eq!(json["sub"], "1");
        assert!(json.get("token_type").is_none());
    }
}
