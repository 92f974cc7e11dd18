//! Session store: the per-user refresh-token pointer
//!
//! A user's session is represented entirely by the single refresh token
//! stored on their row. Writing a new token implicitly invalidates any
//! previous one (no revocation list); clearing writes SQL NULL, which is
//! distinct from an empty string, so a logged-out user can never match
//! an empty presented token. Each operation is a single-row UPDATE, so
//! concurrent writers resolve to last-writer-wins.

use sqlx::PgPool;
use uuid::Uuid;

/// Persistence-backed store for the current refresh token of each user
pub struct SessionStore;

impl SessionStore {
    /// Store a refresh token, unconditionally overwriting any prior value
    pub async fn set_refresh_token(pool: &PgPool, user_id: Uuid, token: &str) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Fetch the currently stored refresh token, if any
    pub async fn get_refresh_token(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT refresh_token FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map(|row| row.flatten())
    }

    /// Unset the stored refresh token, ending the session
    pub async fn clear_refresh_token(pool: &PgPool, user_id: Uuid) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
