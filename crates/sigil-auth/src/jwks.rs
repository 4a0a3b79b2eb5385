//! Public-key export (JWKS)
//!
//! Builds an RFC 7517 JWK Set from the key ring's asymmetric public keys.
//! The HS256 secret is symmetric and is never exported. Key IDs are RFC
//! 7638 thumbprints, so the same key always gets the same `kid`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, EllipticCurve, EllipticCurveKeyParameters,
    EllipticCurveKeyType, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse, RSAKeyParameters, RSAKeyType,
};
use sha2::{Digest, Sha256};

use crate::error::{AuthError, AuthResult};
use crate::keys::{Algorithm, KeyRing};

/// Build the JWK Set for all configured asymmetric keys
pub fn build_jwk_set(ring: &KeyRing) -> AuthResult<JwkSet> {
    let mut keys = Vec::new();

    for algorithm in ring.configured() {
        let entry = ring.for_algorithm(algorithm)?;
        let Some(pem) = entry.public_pem.as_deref() else {
            // Symmetric material has no public half
            continue;
        };

        let jwk = match algorithm {
            Algorithm::Rs256 => rsa_jwk(pem)?,
            Algorithm::Es256 => ec_jwk(pem)?,
            Algorithm::Hs256 => continue,
        };
        keys.push(jwk);
    }

    Ok(JwkSet { keys })
}

/// Build an RSA signature JWK from an SPKI PEM public key
fn rsa_jwk(pem: &str) -> AuthResult<Jwk> {
    use rsa::pkcs8::DecodePublicKey;
    use rsa::traits::PublicKeyParts;

    let key = rsa::RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| AuthError::Config(format!("rs256 public key failed to parse: {e}")))?;

    let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
    let kid = rsa_thumbprint(&n, &e);

    Ok(Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_algorithm: Some(KeyAlgorithm::RS256),
            key_id: Some(kid),
            ..Default::default()
        },
        algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
            key_type: RSAKeyType::RSA,
            n,
            e,
        }),
    })
}

/// Build a P-256 signature JWK from an SPKI PEM public key
fn ec_jwk(pem: &str) -> AuthResult<Jwk> {
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use p256::pkcs8::DecodePublicKey;

    let key = p256::PublicKey::from_public_key_pem(pem)
        .map_err(|e| AuthError::Config(format!("es256 public key failed to parse: {e}")))?;

    let point = key.to_encoded_point(false);
    let (x, y) = match (point.x(), point.y()) {
        (Some(x), Some(y)) => (
            URL_SAFE_NO_PAD.encode(x.as_slice()),
            URL_SAFE_NO_PAD.encode(y.as_slice()),
        ),
        _ => {
            return Err(AuthError::Config(
                "es256 public key has no affine coordinates".to_string(),
            ))
        }
    };
    let kid = ec_thumbprint(&x, &y);

    Ok(Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_algorithm: Some(KeyAlgorithm::ES256),
            key_id: Some(kid),
            ..Default::default()
        },
        algorithm: AlgorithmParameters::EllipticCurve(EllipticCurveKeyParameters {
            key_type: EllipticCurveKeyType::EC,
            curve: EllipticCurve::P256,
            x,
            y,
        }),
    })
}

/// RFC 7638 thumbprint over the canonical RSA members
///
/// `serde_json` maps serialize with sorted keys, which is exactly the
/// lexicographic member order the RFC requires.
fn rsa_thumbprint(n: &str, e: &str) -> String {
    thumbprint(&serde_json::json!({ "e": e, "kty": "RSA", "n": n }))
}

/// RFC 7638 thumbprint over the canonical EC members
fn ec_thumbprint(x: &str, y: &str) -> String {
    thumbprint(&serde_json::json!({ "crv": "P-256", "kty": "EC", "x": x, "y": y }))
}

fn thumbprint(canonical: &serde_json::Value) -> String {
    let digest = Sha256::digest(canonical.to_string().as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_public_pem() -> String {
        use rsa::pkcs8::EncodePublicKey;

        let mut rng = rand::thread_rng();
        let private = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        rsa::RsaPublicKey::from(&private)
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
    }

    fn ec_public_pem() -> String {
        use p256::pkcs8::EncodePublicKey;

        let secret = p256::SecretKey::random(&mut rand::thread_rng());
        secret
            .public_key()
            .to_public_key_pem(p256::pkcs8::LineEnding::LF)
            .unwrap()
    }

    #[test]
    fn test_rsa_jwk_fields() {
        let jwk = rsa_jwk(&rsa_public_pem()).unwrap();

        assert_eq!(jwk.common.public_key_use, Some(PublicKeyUse::Signature));
        assert_eq!(jwk.common.key_algorithm, Some(KeyAlgorithm::RS256));
        assert!(jwk.common.key_id.is_some());

        match &jwk.algorithm {
            AlgorithmParameters::RSA(params) => {
                assert!(!params.n.is_empty());
                // 65537
                assert_eq!(params.e, "AQAB");
            }
            other => panic!("expected RSA parameters, got {other:?}"),
        }
    }

    #[test]
    fn test_ec_jwk_fields() {
        let jwk = ec_jwk(&ec_public_pem()).unwrap();

        assert_eq!(jwk.common.key_algorithm, Some(KeyAlgorithm::ES256));
        match &jwk.algorithm {
            AlgorithmParameters::EllipticCurve(params) => {
                assert_eq!(params.curve, EllipticCurve::P256);
                // Uncompressed P-256 coordinates are 32 bytes -> 43 chars
                // of unpadded base64url
                assert_eq!(params.x.len(), 43);
                assert_eq!(params.y.len(), 43);
            }
            other => panic!("expected EC parameters, got {other:?}"),
        }
    }

    #[test]
    fn test_thumbprint_is_deterministic() {
        let pem = rsa_public_pem();
        let first = rsa_jwk(&pem).unwrap();
        let second = rsa_jwk(&pem).unwrap();
        assert_eq!(first.common.key_id, second.common.key_id);
    }

    #[test]
    fn test_thumbprint_rfc7638_vector() {
        // Appendix 3.1 of RFC 7638
        let n = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAt\
                 VT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn6\
                 4tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FD\
                 W2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n9\
                 1CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINH\
                 aQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";
        let kid = rsa_thumbprint(n, "AQAB");
        assert_eq!(kid, "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs");
    }

    #[test]
    fn test_build_jwk_set_skips_symmetric() {
        use crate::config::KeyConfig;

        let ring = KeyRing::from_config(&KeyConfig::default()).unwrap();
        let set = build_jwk_set(&ring).unwrap();
        assert!(set.keys.is_empty());
    }
}
