//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GRILLPOINT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `GRILLPOINT_REDIS_URL` - Redis connection string (falls back to `REDIS_URL`)
//! - `GRILLPOINT_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `GRILLPOINT_HOST` - Bind address (default: 127.0.0.1)
//! - `GRILLPOINT_PORT` - Listen port (default: 8080)
//! - `GRILLPOINT_TOKEN_TTL_SECS` - Bearer token lifetime (default: 3600)
//! - `GRILLPOINT_CART_TTL_SECS` - Cart record lifetime (default: 30 days)
//! - `GRILLPOINT_REVOCATION_FALLBACK_TTL_SECS` - Denylist TTL for unreadable tokens (default: 3600)
//! - `GRILLPOINT_RATE_LIMIT_MAX_REQUESTS` - Requests allowed per window (default: 100)
//! - `GRILLPOINT_RATE_LIMIT_WINDOW_SECS` - Rate limit window length (default: 60)
//! - `GRILLPOINT_COOKIE_SECURE` - Set the `Secure` flag on the session cookie (default: false)
//! - `GRILLPOINT_ARGON2_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `GRILLPOINT_ARGON2_ITERATIONS` - Argon2 time cost (default: 2)
//! - `GRILLPOINT_ARGON2_PARALLELISM` - Argon2 lanes (default: 1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// Redis connection URL (may contain password)
    pub redis_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Lifetime of issued bearer tokens
    pub token_ttl: Duration,
    /// Lifetime of cart records, refreshed on every write
    pub cart_ttl: Duration,
    /// Denylist TTL used when a revoked token's expiry cannot be read
    pub revocation_fallback_ttl: Duration,
    /// Request rate limiting
    pub rate_limit: RateLimitConfig,
    /// Whether the session cookie carries the `Secure` flag
    pub cookie_secure: bool,
    /// Password hashing cost parameters
    pub hashing: HashingConfig,
}

/// Fixed-window rate limiter configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client.
    pub max_requests: u64,
    /// Window length.
    pub window: Duration,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations (time cost).
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        // Argon2id defaults per the argon2 crate (OWASP-recommended).
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_url_with_fallback("GRILLPOINT_DATABASE_URL", "DATABASE_URL")?;
        let redis_url = get_url_with_fallback("GRILLPOINT_REDIS_URL", "REDIS_URL")?;
        let host = get_env_or_default("GRILLPOINT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GRILLPOINT_HOST".to_string(), e.to_string()))?;
        let port = get_parsed_or_default::<u16>("GRILLPOINT_PORT", 8080)?;

        let jwt_secret = get_required_secret("GRILLPOINT_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "GRILLPOINT_JWT_SECRET")?;

        let token_ttl = get_duration_secs("GRILLPOINT_TOKEN_TTL_SECS", 3600)?;
        let cart_ttl = get_duration_secs("GRILLPOINT_CART_TTL_SECS", 30 * 24 * 3600)?;
        let revocation_fallback_ttl =
            get_duration_secs("GRILLPOINT_REVOCATION_FALLBACK_TTL_SECS", 3600)?;

        let rate_limit = RateLimitConfig {
            max_requests: get_parsed_or_default::<u64>("GRILLPOINT_RATE_LIMIT_MAX_REQUESTS", 100)?,
            window: get_duration_secs("GRILLPOINT_RATE_LIMIT_WINDOW_SECS", 60)?,
        };

        let cookie_secure = get_parsed_or_default::<bool>("GRILLPOINT_COOKIE_SECURE", false)?;

        let hashing = HashingConfig {
            memory_kib: get_parsed_or_default::<u32>("GRILLPOINT_ARGON2_MEMORY_KIB", 19_456)?,
            iterations: get_parsed_or_default::<u32>("GRILLPOINT_ARGON2_ITERATIONS", 2)?,
            parallelism: get_parsed_or_default::<u32>("GRILLPOINT_ARGON2_PARALLELISM", 1)?,
        };

        Ok(Self {
            database_url,
            redis_url,
            host,
            port,
            jwt_secret,
            token_ttl,
            cart_ttl,
            revocation_fallback_ttl,
            rate_limit,
            cookie_secure,
            hashing,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get a connection URL with fallback to a generic variable
/// (`DATABASE_URL`/`REDIS_URL` as set by managed hosting).
fn get_url_with_fallback(primary_key: &str, fallback_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var(fallback_key) {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, using `default` when unset.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse an environment variable holding a duration in whole seconds.
fn get_duration_secs(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    let secs = get_parsed_or_default::<u64>(key, default_secs)?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "duration must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate that the token signing secret is long, random, and not a placeholder.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    validate_secret_strength(value, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("abababababababababababababababab", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_jwt_secret(&secret, "TEST_SECRET").is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid() {
        let secret = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6j");
        assert!(validate_jwt_secret(&secret, "TEST_SECRET").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            redis_url: SecretString::from("redis://localhost:6379"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6j"),
            token_ttl: Duration::from_secs(3600),
            cart_ttl: Duration::from_secs(30 * 24 * 3600),
            revocation_fallback_ttl: Duration::from_secs(3600),
            rate_limit: RateLimitConfig {
                max_requests: 100,
                window: Duration::from_secs(60),
            },
            cookie_secure: false,
            hashing: HashingConfig::default(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }
}
