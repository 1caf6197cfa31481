//! Signed, self-describing credentials.
//!
//! A token is a compact string `base64url(claims).base64url(signature)` where
//! the signature is HMAC-SHA256 over the encoded claims segment, keyed by the
//! process-wide signing secret. Claims are readable by anyone; the signature
//! only makes them tamper-evident.
//!
//! Two lifetimes exist: short-lived access tokens authorize API calls,
//! long-lived refresh tokens only mint new access tokens. [`TokenManager::verify`]
//! does not check the type - callers that require one kind must inspect
//! [`Claims::token_type`] themselves.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::TokenConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The requested lifetime does not put the expiry in the future.
    #[error("token lifetime must be positive")]
    NonPositiveTtl,
    /// The token is not structurally `base64url.base64url`.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the claims segment.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The claims decoded and verified, but the expiry has passed.
    #[error("token has expired")]
    Expired,
    /// The claims segment is not valid claims JSON.
    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),
    /// The signing key was rejected by the MAC.
    #[error("signing key is unusable")]
    Signing,
}

/// The two credential kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived credential authorizing API calls.
    Access,
    /// Long-lived credential used only to mint new access tokens.
    Refresh,
}

impl TokenType {
    /// The wire name of the type, as it appears in claims.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// The key/value payload embedded in a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Absolute expiry instant, unix seconds. Strictly in the future at
    /// issuance.
    pub exp: i64,
    /// Which credential kind this is.
    pub token_type: TokenType,
    /// Caller identifier the token was minted for.
    pub sub: String,
    /// Caller-supplied payload carried alongside the standard claims.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A compact signed credential string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedToken(String);

impl SignedToken {
    /// The compact wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, yielding the wire string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SignedToken> for String {
    fn from(token: SignedToken) -> Self {
        token.0
    }
}

/// Issues and verifies signed credentials.
///
/// Fully synchronous and side-effect free; the only state is the signing
/// secret and lifetime policy, both fixed at construction.
#[derive(Clone)]
pub struct TokenManager {
    secret: SecretString,
    policy: TokenConfig,
}

impl TokenManager {
    /// Create a manager with an explicitly injected signing secret.
    #[must_use]
    pub const fn new(secret: SecretString, policy: TokenConfig) -> Self {
        Self { secret, policy }
    }

    /// Issue a short-lived access token for a caller.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the configured access lifetime is not
    /// positive or the claims cannot be encoded.
    pub fn issue_access(&self, sub: &str) -> Result<SignedToken, TokenError> {
        self.issue(sub, serde_json::Map::new(), self.policy.access_ttl, TokenType::Access)
    }

    /// Issue a long-lived refresh token for a caller.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the configured refresh lifetime is not
    /// positive or the claims cannot be encoded.
    pub fn issue_refresh(&self, sub: &str) -> Result<SignedToken, TokenError> {
        self.issue(sub, serde_json::Map::new(), self.policy.refresh_ttl, TokenType::Refresh)
    }

    /// Issue a token with an explicit payload, lifetime, and type.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NonPositiveTtl`] if `ttl` would not put the
    /// expiry strictly in the future, or an encoding error.
    pub fn issue(
        &self,
        sub: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl: chrono::Duration,
        token_type: TokenType,
    ) -> Result<SignedToken, TokenError> {
        self.issue_at(Utc::now().timestamp(), sub, extra, ttl, token_type)
    }

    /// Verify a token: structure, signature, then freshness.
    ///
    /// The expiry check runs independently of signature validation - a
    /// correctly signed token past its `exp` is still rejected.
    ///
    /// # Errors
    ///
    /// Fails closed: any structural, signature, claims, or freshness problem
    /// is an error.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(Utc::now().timestamp(), token)
    }

    pub(crate) fn issue_at(
        &self,
        now: i64,
        sub: &str,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl: chrono::Duration,
        token_type: TokenType,
    ) -> Result<SignedToken, TokenError> {
        if ttl <= chrono::Duration::zero() {
            return Err(TokenError::NonPositiveTtl);
        }

        let claims = Claims {
            exp: now + ttl.num_seconds(),
            token_type,
            sub: sub.to_owned(),
            extra,
        };

        let payload =
            serde_json::to_vec(&claims).map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
        let claims_segment = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(claims_segment.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(SignedToken(format!("{claims_segment}.{signature}")))
    }

    pub(crate) fn verify_at(&self, now: i64, token: &str) -> Result<Claims, TokenError> {
        let (claims_segment, signature_segment) =
            token.split_once('.').ok_or(TokenError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_segment)
            .map_err(|_| TokenError::Malformed)?;

        // Constant-time comparison happens inside verify_slice.
        let mut mac = self.mac()?;
        mac.update(claims_segment.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(claims_segment)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

        // Freshness check, separate from and in addition to the signature.
        if now - self.policy.clock_skew.num_seconds() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::Signing)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("secret", &"[REDACTED]")
            .field("policy", &self.policy)
            .finish()
    }
}
