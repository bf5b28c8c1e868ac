//! Password hashing.
//!
//! One-way, salted, adaptive hashing with Argon2id. The plaintext never
//! crosses this module's boundary in either direction: callers pass it
//! in, and only the PHC-format digest comes back out.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use crate::config::HashingConfig;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum HashError {
    /// Hashing could not complete (e.g. resource exhaustion).
    #[error("password hashing failed")]
    Hash,

    /// The stored digest is not a valid PHC string.
    #[error("stored password digest is malformed")]
    MalformedDigest,
}

/// Invalid Argon2 cost parameters at construction time.
#[derive(Debug, Error)]
#[error("invalid password hashing parameters: {0}")]
pub struct HashConfigError(String);

/// Capability interface for one-way password hashing.
///
/// A mismatch is a normal negative result (`Ok(false)`), not an error.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `HashError::Hash` if hashing fails.
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Verify `plaintext` against a stored digest.
    ///
    /// # Errors
    ///
    /// Returns `HashError::MalformedDigest` if the digest cannot be
    /// parsed, `HashError::Hash` if verification itself fails.
    fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, HashError>;
}

/// Production hasher using Argon2id with configurable cost.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Build a hasher from the configured cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `HashConfigError` if the parameters are out of Argon2's
    /// accepted ranges.
    pub fn new(config: &HashingConfig) -> Result<Self, HashConfigError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashConfigError(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|err| {
                tracing::error!(error = %err, "password hashing failed");
                HashError::Hash
            })
    }

    fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(digest).map_err(|_| HashError::MalformedDigest)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => {
                tracing::error!(error = %err, "password verification failed");
                Err(HashError::Hash)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Low-cost parameters so the test suite stays fast.
    fn test_hasher() -> Argon2Hasher {
        Argon2Hasher::new(&HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hasher = test_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(hasher.verify(&digest, "secret1").unwrap());
    }

    #[test]
    fn test_wrong_password_is_a_mismatch_not_an_error() {
        let hasher = test_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(!hasher.verify(&digest, "secret2").unwrap());
    }

    #[test]
    fn test_digest_is_salted() {
        let hasher = test_hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_digest_never_contains_plaintext() {
        let hasher = test_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(!digest.contains("secret1"));
    }

    #[test]
    fn test_malformed_digest_is_rejected() {
        let hasher = test_hasher();
        assert!(matches!(
            hasher.verify("not-a-phc-string", "secret1"),
            Err(HashError::MalformedDigest)
        ));
    }

    #[test]
    fn test_rejects_invalid_cost_parameters() {
        let result = Argon2Hasher::new(&HashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }
}
