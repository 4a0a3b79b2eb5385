//! Key material provider
//!
//! Decodes configured key material (shared secrets and base64-wrapped PEM
//! blocks) into ready-to-use `jsonwebtoken` encoding/decoding keys, one
//! fixed pair per algorithm. The ring is assembled once at startup;
//! undecodable material fails construction rather than surfacing later as
//! a spurious 401.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::KeyConfig;
use crate::error::{AuthError, AuthResult};

/// Supported signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Hs256,
    Rs256,
    Es256,
}

impl Algorithm {
    /// All supported algorithms, in route-mounting order
    pub const ALL: [Algorithm; 3] = [Algorithm::Hs256, Algorithm::Rs256, Algorithm::Es256];

    /// Lowercase tag used in URL paths and log fields
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Hs256 => "hs256",
            Self::Rs256 => "rs256",
            Self::Es256 => "es256",
        }
    }

    /// Standard JWA name (`HS256`, `RS256`, `ES256`)
    pub fn jwa_name(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Rs256 => "RS256",
            Self::Es256 => "ES256",
        }
    }

    /// Parse a lowercase path tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "hs256" => Some(Self::Hs256),
            "rs256" => Some(Self::Rs256),
            "es256" => Some(Self::Es256),
            _ => None,
        }
    }

    /// Corresponding `jsonwebtoken` algorithm
    pub fn to_jwt(&self) -> jsonwebtoken::Algorithm {
        match self {
            Self::Hs256 => jsonwebtoken::Algorithm::HS256,
            Self::Rs256 => jsonwebtoken::Algorithm::RS256,
            Self::Es256 => jsonwebtoken::Algorithm::ES256,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Imported key pair for one algorithm
pub struct AlgorithmKeys {
    /// Algorithm these keys belong to
    pub algorithm: Algorithm,
    /// Signing key (secret or private key)
    pub encoding: EncodingKey,
    /// Verification key (secret or public key)
    pub decoding: DecodingKey,
    /// Decoded public-key PEM, kept for JWKS export (asymmetric only)
    pub public_pem: Option<String>,
}

impl std::fmt::Debug for AlgorithmKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output
        f.debug_struct("AlgorithmKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Fixed set of per-algorithm keys, assembled at startup
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    hs256: Option<Arc<AlgorithmKeys>>,
    rs256: Option<Arc<AlgorithmKeys>>,
    es256: Option<Arc<AlgorithmKeys>>,
}

impl KeyRing {
    /// Import all configured key material
    ///
    /// Algorithms with no configured material are simply absent from the
    /// ring; configured-but-undecodable material is a hard error.
    pub fn from_config(config: &KeyConfig) -> AuthResult<Self> {
        let mut ring = Self::default();

        if let Some(secret) = &config.hs256_secret {
            ring.hs256 = Some(Arc::new(AlgorithmKeys {
                algorithm: Algorithm::Hs256,
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                public_pem: None,
            }));
        }

        if let (Some(private), Some(public)) = (&config.rs256_private_key, &config.rs256_public_key)
        {
            let private_pem = decode_pem(private, "rs256 private key")?;
            let public_pem = decode_pem(public, "rs256 public key")?;
            ring.rs256 = Some(Arc::new(AlgorithmKeys {
                algorithm: Algorithm::Rs256,
                encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| {
                    AuthError::Config(format!("rs256 private key rejected: {e}"))
                })?,
                decoding: DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
                    AuthError::Config(format!("rs256 public key rejected: {e}"))
                })?,
                public_pem: Some(public_pem),
            }));
        }

        if let (Some(private), Some(public)) = (&config.es256_private_key, &config.es256_public_key)
        {
            let private_pem = decode_pem(private, "es256 private key")?;
            let public_pem = decode_pem(public, "es256 public key")?;
            ring.es256 = Some(Arc::new(AlgorithmKeys {
                algorithm: Algorithm::Es256,
                encoding: EncodingKey::from_ec_pem(private_pem.as_bytes()).map_err(|e| {
                    AuthError::Config(format!("es256 private key rejected: {e}"))
                })?,
                decoding: DecodingKey::from_ec_pem(public_pem.as_bytes()).map_err(|e| {
                    AuthError::Config(format!("es256 public key rejected: {e}"))
                })?,
                public_pem: Some(public_pem),
            }));
        }

        Ok(ring)
    }

    /// Look up the keys for an algorithm
    ///
    /// A missing entry is a configuration fault (5xx), never a token
    /// failure.
    pub fn for_algorithm(&self, algorithm: Algorithm) -> AuthResult<Arc<AlgorithmKeys>> {
        self.slot(algorithm).cloned().ok_or_else(|| {
            AuthError::Config(format!("no key material configured for {algorithm}"))
        })
    }

    /// Algorithms with key material present
    pub fn configured(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|alg| self.slot(*alg).is_some())
            .collect()
    }

    /// True if the algorithm has key material
    pub fn has(&self, algorithm: Algorithm) -> bool {
        self.slot(algorithm).is_some()
    }

    fn slot(&self, algorithm: Algorithm) -> Option<&Arc<AlgorithmKeys>> {
        match algorithm {
            Algorithm::Hs256 => self.hs256.as_ref(),
            Algorithm::Rs256 => self.rs256.as_ref(),
            Algorithm::Es256 => self.es256.as_ref(),
        }
    }
}

/// Decode a configured PEM block
///
/// Raw PEM is passed through; anything else is treated as base64-wrapped
/// PEM (the transport encoding used for env vars and flat config files).
fn decode_pem(value: &str, what: &str) -> AuthResult<String> {
    let trimmed = value.trim();
    if trimmed.starts_with("-----BEGIN") {
        return Ok(trimmed.to_string());
    }

    let bytes = BASE64
        .decode(trimmed)
        .map_err(|e| AuthError::Config(format!("{what} is not valid base64: {e}")))?;
    let pem = String::from_utf8(bytes)
        .map_err(|_| AuthError::Config(format!("{what} decoded to non-UTF-8 data")))?;

    if !pem.trim_start().starts_with("-----BEGIN") {
        return Err(AuthError::Config(format!("{what} does not contain a PEM block")));
    }
    Ok(pem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_tags_round_trip() {
        for alg in Algorithm::ALL {
            assert_eq!(Algorithm::from_tag(alg.tag()), Some(alg));
        }
        assert_eq!(Algorithm::from_tag("none"), None);
        assert_eq!(Algorithm::from_tag("HS256"), None);
    }

    #[test]
    fn test_ring_from_default_config_has_hs256_only() {
        let ring = KeyRing::from_config(&KeyConfig::default()).unwrap();
        assert_eq!(ring.configured(), vec![Algorithm::Hs256]);
        assert!(ring.for_algorithm(Algorithm::Hs256).is_ok());
    }

    #[test]
    fn test_missing_algorithm_is_config_error() {
        let ring = KeyRing::from_config(&KeyConfig::default()).unwrap();
        let err = ring.for_algorithm(Algorithm::Rs256).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_undecodable_pem_fails_construction() {
        let config = KeyConfig {
            rs256_private_key: Some("not-base64!!".to_string()),
            rs256_public_key: Some("not-base64!!".to_string()),
            ..KeyConfig::default()
        };
        assert!(matches!(
            KeyRing::from_config(&config),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_decode_pem_accepts_raw_and_wrapped() {
        let raw = "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----";
        assert_eq!(decode_pem(raw, "key").unwrap(), raw);

        let wrapped = BASE64.encode(raw);
        assert_eq!(decode_pem(&wrapped, "key").unwrap(), raw);
    }

    #[test]
    fn test_decode_pem_rejects_non_pem_payload() {
        let wrapped = BASE64.encode("just some text");
        assert!(decode_pem(&wrapped, "key").is_err());
    }
}
