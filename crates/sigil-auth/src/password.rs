//! Password hashing service
//!
//! PBKDF2-HMAC-SHA256 in PHC string format. The iteration count comes from
//! configuration but is clamped to [`MAX_PBKDF2_ITERATIONS`] at service
//! construction; a runaway config value must not pin a CPU for seconds per
//! login.
//!
//! The hashed-credential login flow registers an account on first sight of
//! an email, behind the [`CredentialStore`] trait so the in-memory demo
//! store can be swapped for a real one.

use async_trait::async_trait;
use pbkdf2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Pbkdf2,
};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::{PasswordConfig, MAX_PBKDF2_ITERATIONS};
use crate::error::{AuthError, AuthResult};

/// Output length of the derived key in bytes
const HASH_OUTPUT_LENGTH: usize = 32;

/// PBKDF2 password hashing service
#[derive(Debug, Clone)]
pub struct PasswordService {
    iterations: u32,
}

impl PasswordService {
    /// Create a service with the configured (clamped) iteration count
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            iterations: config.iterations.min(MAX_PBKDF2_ITERATIONS),
        }
    }

    /// Effective iteration count after clamping
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.hash_with_iterations(password, self.iterations)
    }

    /// Verify a password against a PHC-format hash
    ///
    /// A mismatch is `InvalidCredentials`; a hash that fails to parse is an
    /// internal fault, not a credential failure.
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashingFailed)?;
        Pbkdf2.verify_password(password.as_bytes(), &parsed)?;
        Ok(())
    }

    /// Time a single hash at the requested cost (clamped to the cap)
    pub fn benchmark(&self, password: &str, iterations: Option<u32>) -> AuthResult<HashTiming> {
        let iterations = iterations
            .unwrap_or(self.iterations)
            .min(MAX_PBKDF2_ITERATIONS);

        let start = Instant::now();
        let hash = self.hash_with_iterations(password, iterations)?;
        let elapsed = start.elapsed();

        Ok(HashTiming {
            iterations,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            hash,
        })
    }

    fn hash_with_iterations(&self, password: &str, iterations: u32) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params {
            rounds: iterations,
            output_length: HASH_OUTPUT_LENGTH,
        };

        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|_| AuthError::PasswordHashingFailed)?;
        Ok(hash.to_string())
    }
}

/// Result of a hashing-cost measurement
#[derive(Debug, Clone, Serialize)]
pub struct HashTiming {
    /// Iteration count actually used
    pub iterations: u32,
    /// Wall-clock time for one hash
    pub elapsed_ms: f64,
    /// The produced hash (PHC string)
    pub hash: String,
}

// =============================================================================
// Credential Store
// =============================================================================

/// Storage for hashed credentials, keyed by email
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored hash for an email, registering the account with
    /// `password_hash` if the email is unknown.
    ///
    /// Returns the stored hash and whether the account was just created.
    async fn get_or_create(&self, email: &str, password_hash: &str) -> AuthResult<(String, bool)>;

    /// Number of registered accounts
    async fn len(&self) -> usize;
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_or_create(&self, email: &str, password_hash: &str) -> AuthResult<(String, bool)> {
        {
            let users = self.users.read().await;
            if let Some(stored) = users.get(email) {
                return Ok((stored.clone(), false));
            }
        }

        let mut users = self.users.write().await;
        // Re-check under the write lock; another task may have registered
        // the same email between lock acquisitions
        if let Some(stored) = users.get(email) {
            return Ok((stored.clone(), false));
        }
        users.insert(email.to_string(), password_hash.to_string());
        Ok((password_hash.to_string(), true))
    }

    async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}
