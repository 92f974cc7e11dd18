//! JWT token issuance and verification
//!
//! Access and refresh tokens are structurally identical but signed with
//! distinct secrets and expire independently. Keys are pre-computed once
//! at startup and cached, so per-request token work never re-derives them.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token verification failure
///
/// Callers surface every variant to the client as a uniform
/// authentication failure; the distinction exists for logging.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed or has an invalid signature")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Pre-computed key pair for one token kind
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token lifetimes in seconds
#[derive(Clone)]
pub struct TokenConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// Token service for issuing and verifying both token kinds
///
/// Create once at application startup and store in AppState; cloning is
/// cheap because the keys are wrapped in Arc.
#[derive(Clone)]
pub struct TokenService {
    access: TokenKeys,
    refresh: TokenKeys,
    config: TokenConfig,
}

impl TokenService {
    /// Create a new token service with pre-computed keys
    pub fn new(access_secret: &str, refresh_secret: &str, config: TokenConfig) -> Self {
        Self {
            access: TokenKeys::new(access_secret),
            refresh: TokenKeys::new(refresh_secret),
            config,
        }
    }

    /// Issue an access token for a user
    #[inline]
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        Self::issue(&self.access, user_id, self.config.access_token_expiry_secs)
    }

    /// Issue a refresh token for a user
    #[inline]
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        Self::issue(&self.refresh, user_id, self.config.refresh_token_expiry_secs)
    }

    fn issue(keys: &TokenKeys, user_id: Uuid, expiry_secs: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &keys.encoding)?)
    }

    /// Verify an access token and return its claims
    #[inline]
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::decode_with(&self.access, token)
    }

    /// Verify a refresh token and return its claims
    #[inline]
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::decode_with(&self.refresh, token)
    }

    fn decode_with(keys: &TokenKeys, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &keys.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    /// Get refresh token expiry in seconds
    #[inline]
    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }
}
