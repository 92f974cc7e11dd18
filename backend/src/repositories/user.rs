//! User repository for database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User role, a closed set checked by the role gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User record from database
///
/// `password_hash` and `refresh_token` never leave the server; outbound
/// responses use [`PublicUser`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    /// The single currently-valid refresh token, if a session exists.
    /// NULL means logged out; overwriting ends any previous session.
    pub refresh_token: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outbound user representation, stripped of credential fields
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Insert a new user
    ///
    /// A duplicate email surfaces as a unique-violation database error;
    /// the caller maps it to a conflict.
    pub async fn create(pool: &PgPool, new_user: &NewUser) -> sqlx::Result<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, role, password_hash, refresh_token,
                      active, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(pool)
        .await
    }

    /// Find user by email, including the password hash
    pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, role, password_hash, refresh_token,
                   active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Find user by ID, including the stored refresh token
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, role, password_hash, refresh_token,
                   active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List all users, newest first
    pub async fn list(pool: &PgPool) -> sqlx::Result<Vec<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, role, password_hash, refresh_token,
                   active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_has_no_credential_fields() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            role: Role::User,
            password_hash: "$2b$12$hash".to_string(),
            refresh_token: Some("token".to_string()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public: PublicUser = record.into();
        let json = serde_json::to_value(&public).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
    }
}
