//! Bearer token issuance and validation.
//!
//! Tokens are stateless HS256-signed structures carrying the username
//! and an absolute expiry. Validation is pinned to the HS256 algorithm,
//! so a token asserting any other algorithm is rejected before its
//! claims are looked at.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grillpoint_core::Username;

/// Clock skew tolerance for expiry checks, in seconds.
const EXPIRY_LEEWAY_SECS: u64 = 5;

/// Errors from token operations.
///
/// Validation failures deliberately collapse into one variant; the
/// distinct causes are logged, never returned.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing the token failed.
    #[error("token signing failed")]
    Signing,

    /// The token is malformed, mis-signed, or expired.
    #[error("invalid token")]
    Invalid,
}

/// Claims embedded in an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated username.
    pub username: String,
    /// Absolute expiry as a Unix timestamp in seconds.
    pub exp: i64,
}

/// Issues and validates signed bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service signing with `secret` and issuing tokens
    /// that live for `ttl`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = EXPIRY_LEEWAY_SECS;

        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a signed token for `username`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if signing fails.
    pub fn issue(&self, username: &Username) -> Result<String, TokenError> {
        let claims = Claims {
            username: username.as_str().to_owned(),
            exp: Utc::now().timestamp().saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "token signing failed");
            TokenError::Signing
        })
    }

    /// Validate `raw` and return its claims.
    ///
    /// The signature is verified before any claim is trusted, and only
    /// HS256 is accepted.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for every failure mode; the cause is
    /// logged with its distinct reason.
    pub fn validate(&self, raw: &str) -> Result<Claims, TokenError> {
        match decode::<Claims>(raw, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                match err.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("rejected expired token");
                    }
                    ErrorKind::InvalidSignature => {
                        tracing::warn!("rejected token with invalid signature");
                    }
                    ErrorKind::InvalidAlgorithm => {
                        tracing::warn!("rejected token signed with unexpected algorithm");
                    }
                    other => {
                        tracing::debug!(cause = ?other, "rejected malformed token");
                    }
                }
                Err(TokenError::Invalid)
            }
        }
    }

    /// Time left until `raw`'s embedded expiry, without verifying the
    /// signature.
    ///
    /// Returns `None` when the claims cannot be read at all, and
    /// `Some(Duration::ZERO)` when the token is already past its expiry.
    /// Used only to size revocation-list TTLs at logout; never as an
    /// authentication decision.
    #[must_use]
    pub fn remaining_lifetime(&self, raw: &str) -> Option<Duration> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(raw, &self.decoding, &validation).ok()?.claims;
        let remaining = claims.exp - Utc::now().timestamp();
        Some(Duration::from_secs(u64::try_from(remaining).unwrap_or(0)))
    }
}
