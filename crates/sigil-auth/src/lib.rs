//! Sigil Authentication Core
//!
//! Multi-algorithm JWT bearer authentication over a single contract:
//!
//! - **Three signature algorithms**: HS256, RS256, ES256, each with its own
//!   fixed key material
//! - **Access + refresh tokens**: short-lived access (15m), long-lived
//!   refresh (7d), stateless rotation
//! - **Pinned verification**: the verifier's algorithm comes from
//!   configuration, never from the token header
//! - **JWKS export**: RFC 7517 public keys with RFC 7638 thumbprint kids
//! - **Password hashing**: PBKDF2-HMAC-SHA256 with a hard iteration cap
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Verification Flow                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Request → BearerAuth(alg, type) → Handler                  │
//! │                    │                                        │
//! │                    ▼                                        │
//! │          TokenService (one per configured algorithm)        │
//! │                    │                                        │
//! │                    ▼                                        │
//! │          KeyRing → AlgorithmKeys (fixed at startup)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod jwks;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod token;
pub mod types;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use keys::{Algorithm, KeyRing};
pub use middleware::{AuthContext, BearerAuth, BearerAuthLayer, VerifiedClaims};
pub use password::{CredentialStore, MemoryCredentialStore, PasswordService};
pub use token::TokenService;
pub use types::{TokenClaims, TokenPair, TokenType};

use std::collections::HashMap;
use std::sync::Arc;

/// Main authentication service combining all components
///
/// One [`TokenService`] is built per configured algorithm at construction;
/// requests for an unconfigured algorithm surface as configuration faults.
pub struct AuthService {
    tokens: HashMap<Algorithm, Arc<TokenService>>,
    keyring: KeyRing,
    pub password: PasswordService,
    pub credentials: Arc<dyn CredentialStore>,
    config: AuthConfig,
}

impl AuthService {
    /// Create an auth service with the in-memory credential store
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        Self::with_credential_store(config, Arc::new(MemoryCredentialStore::new()))
    }

    /// Create an auth service with a caller-provided credential store
    pub fn with_credential_store(
        config: AuthConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|errors| AuthError::Config(errors.join("; ")))?;

        let keyring = KeyRing::from_config(&config.keys)?;
        let mut tokens = HashMap::new();
        for algorithm in keyring.configured() {
            let entry = keyring.for_algorithm(algorithm)?;
            tokens.insert(
                algorithm,
                Arc::new(TokenService::new(entry, &config.tokens)),
            );
        }

        let password = PasswordService::new(&config.password);

        Ok(Self {
            tokens,
            keyring,
            password,
            credentials,
            config,
        })
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Algorithms with key material configured
    pub fn configured_algorithms(&self) -> Vec<Algorithm> {
        self.keyring.configured()
    }

    /// Token service for one algorithm
    ///
    /// Absence is a configuration fault (500 at the HTTP boundary), not a
    /// token failure.
    pub fn token_service(&self, algorithm: Algorithm) -> AuthResult<Arc<TokenService>> {
        self.tokens.get(&algorithm).cloned().ok_or_else(|| {
            AuthError::Config(format!("no key material configured for {algorithm}"))
        })
    }

    /// Check the JWT login credentials against the configured identity
    ///
    /// Plaintext comparison by design; the hashed flows live in
    /// [`password`].
    pub fn check_login(&self, email: &str, password: &str) -> AuthResult<()> {
        let identity = &self.config.test_identity;
        if email == identity.email && password == identity.password {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Verify an access token under any configured algorithm
    ///
    /// Each attempt stays pinned to its own (algorithm, key) pair; this is
    /// a sequence of strict verifications, not a relaxed one.
    pub fn verify_any_access(&self, token: &str) -> AuthResult<(Algorithm, TokenClaims)> {
        for algorithm in Algorithm::ALL {
            if let Some(service) = self.tokens.get(&algorithm) {
                if let Ok(claims) = service.verify(token, TokenType::Access) {
                    return Ok((algorithm, claims));
                }
            }
        }
        Err(AuthError::InvalidToken)
    }

    /// JWK Set for the configured asymmetric public keys
    pub fn jwk_set(&self) -> AuthResult<jsonwebtoken::jwk::JwkSet> {
        jwks::build_jwk_set(&self.keyring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_from_default_config() {
        let service = AuthService::new(AuthConfig::default()).unwrap();
        assert_eq!(service.configured_algorithms(), vec![Algorithm::Hs256]);
        assert!(service.token_service(Algorithm::Hs256).is_ok());
        assert!(matches!(
            service.token_service(Algorithm::Rs256),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AuthConfig::default();
        config.keys.hs256_secret = Some("too-short".to_string());
        assert!(matches!(AuthService::new(config), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_check_login() {
        let service = AuthService::new(AuthConfig::default()).unwrap();
        assert!(service.check_login("test@example.com", "password123").is_ok());
        assert!(matches!(
            service.check_login("test@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.check_login("other@example.com", "password123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_any_access() {
        let service = AuthService::new(AuthConfig::default()).unwrap();
        let tokens = service.token_service(Algorithm::Hs256).unwrap();
        let pair = tokens.generate_token_pair("1", "test@example.com").unwrap();

        let (algorithm, claims) = service.verify_any_access(&pair.access_token).unwrap();
        assert_eq!(algorithm, Algorithm::Hs256);
        assert_eq!(claims.sub, "1");

        // A refresh token never passes the access gate
        assert!(service.verify_any_access(&pair.refresh_token).is_err());
        assert!(service.verify_any_access("garbage").is_err());
    }
}
