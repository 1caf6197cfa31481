//! Pipeline configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GREENSTALL_SIGNING_SECRET` - Token signing secret (min 32 chars, high
//!   entropy)
//!
//! ## Optional
//! - `GREENSTALL_AUTH_PREFIX_LEN` - Characters stripped from the
//!   authorization header before the raw token (default: 4, the `"JWT "`
//!   scheme)
//! - `GREENSTALL_ACCESS_TTL_MINUTES` - Access token lifetime (default: 5)
//! - `GREENSTALL_REFRESH_TTL_MINUTES` - Refresh token lifetime
//!   (default: 10080, one week)
//! - `GREENSTALL_CLOCK_SKEW_SECONDS` - Expiry check tolerance (default: 0)
//! - `GREENSTALL_LOOKUP_TIMEOUT_MS` - Directory lookup bound (default: 2000)
//! - `GREENSTALL_PAGE_SIZE` - Items per page envelope (default: 10)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SIGNING_SECRET_LENGTH: usize = 32;
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

/// Top-level pipeline configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Process-wide token signing secret.
    pub signing_secret: SecretString,
    /// Authentication-resolver settings.
    pub auth: AuthConfig,
    /// Token lifetime policies.
    pub tokens: TokenConfig,
    /// Items per page envelope.
    pub page_size: u32,
}

/// Authentication-resolver settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Number of characters stripped from the authorization header value
    /// (scheme plus separator) before the raw token. The observed contract
    /// is 4 (`"JWT "`); deployments using `"Bearer "` set 7.
    pub scheme_prefix_len: usize,
    /// Upper bound on the user-directory lookup.
    pub lookup_timeout: Duration,
}

/// Token lifetime policies.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime. Short: these authorize API calls.
    pub access_ttl: chrono::Duration,
    /// Refresh token lifetime. Long: these only mint new access tokens.
    pub refresh_ttl: chrono::Duration,
    /// Tolerance applied to the expiry check, for clock skew between the
    /// issuing and verifying hosts.
    pub clock_skew: chrono::Duration,
}

impl GraphConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let signing_secret = get_validated_secret("GREENSTALL_SIGNING_SECRET")?;
        validate_secret_length(&signing_secret, "GREENSTALL_SIGNING_SECRET")?;

        let scheme_prefix_len = parse_env_or("GREENSTALL_AUTH_PREFIX_LEN", 4_usize)?;
        let access_minutes = parse_env_or("GREENSTALL_ACCESS_TTL_MINUTES", 5_i64)?;
        let refresh_minutes = parse_env_or("GREENSTALL_REFRESH_TTL_MINUTES", 7 * 24 * 60_i64)?;
        let skew_seconds = parse_env_or("GREENSTALL_CLOCK_SKEW_SECONDS", 0_i64)?;
        let lookup_timeout_ms = parse_env_or("GREENSTALL_LOOKUP_TIMEOUT_MS", 2000_u64)?;
        let page_size = parse_env_or("GREENSTALL_PAGE_SIZE", 10_u32)?;

        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GREENSTALL_PAGE_SIZE".to_owned(),
                "must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            signing_secret,
            auth: AuthConfig {
                scheme_prefix_len,
                lookup_timeout: Duration::from_millis(lookup_timeout_ms),
            },
            tokens: TokenConfig {
                access_ttl: chrono::Duration::minutes(access_minutes),
                refresh_ttl: chrono::Duration::minutes(refresh_minutes),
                clock_skew: chrono::Duration::seconds(skew_seconds),
            },
            page_size,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that the signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SIGNING_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SIGNING_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
