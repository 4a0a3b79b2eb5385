//! Request/response DTOs
//!
//! Wire types for all endpoints. Bodies are camelCase on the wire.

use serde::{Deserialize, Serialize};
use sigil_audit::RequestLogEntry;
use sigil_auth::TokenClaims;

// =============================================================================
// JWT Flows
// =============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login / refresh response carrying a fresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    /// Human-readable outcome
    pub message: String,
    /// Algorithm tag the tokens were signed under
    pub algorithm: String,
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Verify response echoing the validated claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub algorithm: String,
    /// The verified claims (`sub`, `email`, `type`, `iat`, `exp`)
    pub payload: TokenClaims,
}

/// Gated demo payload behind the protected route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResponse {
    pub message: String,
    pub algorithm: String,
    pub user: UserInfo,
    pub data: ProtectedData,
}

/// Basic user info for responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}

/// Demo payload contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedData {
    pub secret_info: String,
    pub timestamp: String,
}

// =============================================================================
// Password Flows
// =============================================================================

/// Hashed-credential login request
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordLoginRequest {
    pub email: String,
    pub password: String,
}

/// Hashed-credential login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordLoginResponse {
    pub message: String,
    pub email: String,
    /// True when this login registered the account
    pub registered: bool,
}

/// Hash request
#[derive(Debug, Clone, Deserialize)]
pub struct HashRequest {
    pub password: String,
    /// Optional cost override, clamped to the service cap
    pub iterations: Option<u32>,
}

/// Hash response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    /// PHC-format hash string
    pub hash: String,
    /// Iteration count actually used
    pub iterations: u32,
}

/// Benchmark request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchmarkRequest {
    pub password: String,
    pub iterations: Option<u32>,
}

impl Default for BenchmarkRequest {
    fn default() -> Self {
        Self {
            password: "benchmark-password".to_string(),
            iterations: None,
        }
    }
}

/// Benchmark response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResponse {
    pub iterations: u32,
    pub elapsed_ms: f64,
}

// =============================================================================
// Logs & Health
// =============================================================================

/// Query parameters for `GET /logs`
#[derive(Debug, Clone, Deserialize)]
pub struct LogsQuery {
    /// Maximum entries to return (newest first)
    pub limit: Option<usize>,
}

/// `GET /logs` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub count: usize,
    pub logs: Vec<RequestLogEntry>,
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_response_is_camel_case() {
        let response = TokenPairResponse {
            message: "Login successful".to_string(),
            algorithm: "hs256".to_string(),
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 900,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
        assert_eq!(json["expiresIn"], 900);
        assert!(json.get("access_token").is_none());
    }

    #[test]
    fn test_verify_response_payload_uses_claim_names() {
        let response = VerifyResponse {
            valid: true,
            algorithm: "rs256".to_string(),
            payload: TokenClaims {
                sub: "1".to_string(),
                email: "test@example.com".to_string(),
                token_type: sigil_auth::TokenType::Access,
                iat: 1,
                exp: 2,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["payload"]["type"], "access");
    }
}
