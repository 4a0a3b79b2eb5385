//! Authentication configuration
//!
//! Centralized configuration for token lifetimes, key material, the password
//! hashing parameters, and the single built-in demo identity.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Token lifetime configuration
    pub tokens: TokenConfig,
    /// Signing key material per algorithm
    pub keys: KeyConfig,
    /// Password hashing configuration
    pub password: PasswordConfig,
    /// The single identity the JWT login flows accept
    pub test_identity: TestIdentity,
}

/// Token lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
        }
    }
}

/// Signing key material, one slot per supported algorithm
///
/// PEM blocks are carried base64-encoded so the values survive env-var and
/// flat-file transport without multiline escaping. Raw PEM (starting with
/// `-----BEGIN`) is also accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// HS256 shared secret (at least 32 bytes)
    pub hs256_secret: Option<String>,
    /// RS256 private key, PKCS#8 PEM
    pub rs256_private_key: Option<String>,
    /// RS256 public key, SPKI PEM
    pub rs256_public_key: Option<String>,
    /// ES256 (P-256) private key, PKCS#8 PEM
    pub es256_private_key: Option<String>,
    /// ES256 (P-256) public key, SPKI PEM
    pub es256_public_key: Option<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            // Development fallback; override in any real deployment
            hs256_secret: Some("dev-only-hs256-secret-change-me-32b!".to_string()),
            rs256_private_key: None,
            rs256_public_key: None,
            es256_private_key: None,
            es256_public_key: None,
        }
    }
}

/// Password hashing configuration (PBKDF2-HMAC-SHA256)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// PBKDF2 iteration count; values above [`MAX_PBKDF2_ITERATIONS`] are
    /// clamped at service construction
    pub iterations: u32,
}

/// Hard cap on PBKDF2 iterations, applied regardless of configuration
pub const MAX_PBKDF2_ITERATIONS: u32 = 100_000;

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            iterations: MAX_PBKDF2_ITERATIONS,
        }
    }
}

/// The single identity accepted by the JWT login flows
///
/// There is deliberately no user store behind these flows; login is a
/// plaintext comparison against this configured identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestIdentity {
    /// Stable subject claim for issued tokens
    pub user_id: String,
    /// Accepted email
    pub email: String,
    /// Accepted password (plaintext by design; see password module for the
    /// hashed credential flows)
    pub password: String,
}

impl Default for TestIdentity {
    fn default() -> Self {
        Self {
            user_id: "1".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let any_key = self.keys.hs256_secret.is_some()
            || self.keys.rs256_private_key.is_some()
            || self.keys.es256_private_key.is_some();
        if !any_key {
            errors.push("at least one signing key must be configured".to_string());
        }

        if let Some(secret) = &self.keys.hs256_secret {
            if secret.len() < 32 {
                errors.push("HS256 secret should be at least 256 bits (32 bytes)".to_string());
            }
        }

        if self.keys.rs256_private_key.is_some() != self.keys.rs256_public_key.is_some() {
            errors.push("RS256 requires both a private and a public key".to_string());
        }
        if self.keys.es256_private_key.is_some() != self.keys.es256_public_key.is_some() {
            errors.push("ES256 requires both a private and a public key".to_string());
        }

        if self.password.iterations == 0 {
            errors.push("PBKDF2 iteration count must be positive".to_string());
        }

        if self.tokens.access_token_lifetime.is_zero() {
            errors.push("access token lifetime must be positive".to_string());
        }
        if self.tokens.refresh_token_lifetime <= self.tokens.access_token_lifetime {
            errors.push("refresh token lifetime must exceed the access token lifetime".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
