//! Session control: signup, login, refresh, logout
//!
//! Orchestrates the password hasher, token service and session store.
//! Signup and login share one issue-session routine, so logging in from
//! anywhere overwrites the stored refresh token and implicitly ends any
//! previous session for that user.

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{NewUser, PublicUser, SessionStore, UserRecord, UserRepository};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const BAD_CREDENTIALS: &str = "Incorrect email or password";
const REVOKED_REFRESH: &str = "The token is no longer valid or has been revoked.";

/// A freshly established session: both credentials plus the outbound
/// user representation (credential fields already stripped).
#[derive(Debug)]
pub struct SignedSession {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Session controller
pub struct AuthService;

impl AuthService {
    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Issue both tokens for a user and persist the refresh token,
    /// replacing whatever session existed before.
    async fn issue_session(
        pool: &PgPool,
        tokens: &TokenService,
        user: UserRecord,
    ) -> Result<SignedSession, ApiError> {
        let access_token = tokens
            .issue_access_token(user.id)
            .map_err(|e| ApiError::Internal(e.into()))?;
        let refresh_token = tokens
            .issue_refresh_token(user.id)
            .map_err(|e| ApiError::Internal(e.into()))?;

        SessionStore::set_refresh_token(pool, user.id, &refresh_token).await?;

        Ok(SignedSession {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Create an account and log it in
    ///
    /// The password is hashed exactly once, on the blocking thread pool,
    /// before anything is persisted. A duplicate email is a conflict.
    pub async fn signup(
        pool: &PgPool,
        tokens: &TokenService,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignedSession, ApiError> {
        let email = Self::normalize_email(email);

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let new_user = NewUser {
            name: name.trim().to_string(),
            email,
            password_hash,
        };

        let user = UserRepository::create(pool, &new_user)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("Email already in use".to_string())
                } else {
                    ApiError::Database(e)
                }
            })?;

        Self::issue_session(pool, tokens, user).await
    }

    /// Authenticate with email and password
    ///
    /// An unknown email and a wrong password produce the same message,
    /// so a caller cannot probe which field was wrong.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<SignedSession, ApiError> {
        let email = Self::normalize_email(email);

        let user = UserRepository::find_by_email(pool, &email)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated(BAD_CREDENTIALS.to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthenticated(BAD_CREDENTIALS.to_string()));
        }

        Self::issue_session(pool, tokens, user).await
    }

    /// Mint a new access token from a presented refresh token
    ///
    /// The presented token must decode under the refresh secret and be
    /// byte-identical to the one stored for its subject; a token rotated
    /// out by a later login fails here. The refresh token itself is not
    /// rotated by this flow.
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenService,
        presented: &str,
    ) -> Result<String, ApiError> {
        let claims = tokens.decode_refresh_token(presented).map_err(|e| {
            debug!(reason = %e, "refresh token rejected");
            ApiError::Unauthenticated(REVOKED_REFRESH.to_string())
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthenticated(REVOKED_REFRESH.to_string()))?;

        // A deleted user and a rotated-out token both read back as "no
        // matching stored token" and fail identically.
        let stored = SessionStore::get_refresh_token(pool, user_id).await?;

        match stored.as_deref() {
            Some(stored) if stored == presented => tokens
                .issue_access_token(user_id)
                .map_err(|e| ApiError::Internal(e.into())),
            _ => {
                debug!(%user_id, "presented refresh token does not match the stored session");
                Err(ApiError::Unauthenticated(REVOKED_REFRESH.to_string()))
            }
        }
    }

    /// End the current session
    ///
    /// Unsets the stored refresh token (NULL, not empty), so subsequent
    /// `protect` calls treat the session as absent.
    pub async fn logout(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
        SessionStore::clear_refresh_token(pool, user_id).await?;
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
        .unwrap_or(false)
}
