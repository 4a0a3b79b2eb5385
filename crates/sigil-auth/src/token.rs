//! Token codec
//!
//! Signing and verification for one fixed (algorithm, key) pair. The
//! verifier is pinned at construction: the algorithm list handed to
//! `jsonwebtoken` always contains exactly the configured algorithm, and the
//! token header is additionally checked against it before any signature
//! work, so a token can never select the primitive it is verified with.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, DecodingKey, Header, Validation};
use std::sync::Arc;

use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};
use crate::keys::{Algorithm, AlgorithmKeys};
use crate::types::{TokenClaims, TokenPair, TokenType};

/// Signs and verifies tokens under one fixed algorithm
pub struct TokenService {
    keys: Arc<AlgorithmKeys>,
    access_lifetime: std::time::Duration,
    refresh_lifetime: std::time::Duration,
}

impl TokenService {
    /// Create a token service bound to one key pair
    pub fn new(keys: Arc<AlgorithmKeys>, config: &TokenConfig) -> Self {
        Self {
            keys,
            access_lifetime: config.access_token_lifetime,
            refresh_lifetime: config.refresh_token_lifetime,
        }
    }

    /// The algorithm this service signs and verifies with
    pub fn algorithm(&self) -> Algorithm {
        self.keys.algorithm
    }

    /// Access token lifetime in whole seconds (for `expiresIn` responses)
    pub fn access_lifetime_secs(&self) -> u64 {
        self.access_lifetime.as_secs()
    }

    /// Sign a single token of the given type
    pub fn sign(&self, sub: &str, email: &str, token_type: TokenType) -> AuthResult<String> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let now = Utc::now();
        let exp = now
            + Duration::from_std(lifetime).map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = TokenClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::new(self.keys.algorithm.to_jwt()),
            &claims,
            &self.keys.encoding,
        )
        .map_err(|e| AuthError::Internal(format!("failed to sign {token_type} token: {e}")))
    }

    /// Generate a new token pair (access + refresh) for one subject
    pub fn generate_token_pair(&self, sub: &str, email: &str) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access_exp = now
            + Duration::from_std(self.access_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_exp = now
            + Duration::from_std(self.refresh_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(TokenPair {
            access_token: self.sign(sub, email, TokenType::Access)?,
            refresh_token: self.sign(sub, email, TokenType::Refresh)?,
            access_expires_at: access_exp.timestamp(),
            refresh_expires_at: refresh_exp.timestamp(),
        })
    }

    /// Verify a token and require the expected type
    ///
    /// The header's declared algorithm is compared against the pinned
    /// algorithm up front; the comparison is informational hardening on top
    /// of the single-element algorithm list below, which already rejects
    /// anything the service was not configured for.
    pub fn verify(&self, token: &str, expected_type: TokenType) -> AuthResult<TokenClaims> {
        let header = decode_header(token)?;
        if header.alg != self.keys.algorithm.to_jwt() {
            return Err(AuthError::AlgorithmMismatch);
        }

        let mut validation = Validation::new(self.keys.algorithm.to_jwt());
        // No expiry grace window; an expired token is expired
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.keys.decoding, &validation)?;

        if data.claims.token_type != expected_type {
            return Err(AuthError::InvalidTokenType);
        }

        Ok(data.claims)
    }
}

/// Decode claims without verifying signature or expiry
///
/// Introspection only (log enrichment, token debugging). The result must
/// never gate access.
pub fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims::<&str>(&[]);

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}
