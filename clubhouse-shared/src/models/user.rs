/// User model and database operations
///
/// Every operation takes any Postgres executor, so the same calls work on a
/// pool or inside a transaction (signup runs its duplicate check and insert
/// on one transaction).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     uuid UUID NOT NULL DEFAULT gen_random_uuid(),
///     first_name VARCHAR(30) NOT NULL,
///     last_name VARCHAR(30) NOT NULL,
///     username VARCHAR(20) NOT NULL,
///     email VARCHAR(50) NOT NULL,
///     hashed_password VARCHAR(255) NOT NULL,
///     profile_image_url VARCHAR(255) NOT NULL DEFAULT 'https://www.profileimageurl.com',
///     role VARCHAR(32) NOT NULL DEFAULT 'player',
///     organization_id BIGINT REFERENCES organizations (id),
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX users_email_active_key ON users (email) WHERE is_deleted = FALSE;
/// CREATE UNIQUE INDEX users_username_active_key ON users (username) WHERE is_deleted = FALSE;
/// ```
///
/// Uniqueness of email and username holds among live rows only. Inserting a
/// duplicate fails with a unique-violation database error naming one of the
/// two indexes above.
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if let Some(user) = User::find_by_email(&pool, "user.userson@example.com").await? {
///     println!("{} is a {}", user.username, user.role);
/// }
/// # Ok(())
/// # }
/// ```

use crate::schemas::user::{UserCreateInternal, UserDelete, UserRestoreDeleted, UserUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;
use uuid::Uuid;

/// Account role, stored as its snake_case name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    OrgHead,
    Player,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::OrgHead => "org_head",
            UserRole::Player => "player",
        }
    }
}

/// Returned when a stored role name is not one of the known roles
#[derive(Debug, thiserror::Error)]
#[error("Unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl TryFrom<String> for UserRole {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "super_admin" => Ok(UserRole::SuperAdmin),
            "org_head" => Ok(UserRole::OrgHead),
            "player" => Ok(UserRole::Player),
            _ => Err(UnknownRole(value)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User row
///
/// Carries the password hash; convert to
/// [`UserRead`](crate::schemas::user::UserRead) before returning it to a
/// client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub profile_image_url: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub organization_id: Option<i64>,
    pub is_superuser: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Inserts a user from its internal creation record
    ///
    /// # Errors
    ///
    /// - unique violation when the email or username is taken by a live user
    /// - foreign key violation when `organization_id` does not exist
    pub async fn create<'e, E>(executor: E, data: UserCreateInternal) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, username, email, hashed_password,
                               role, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, uuid, first_name, last_name, username, email, hashed_password,
                      profile_image_url, role, organization_id, is_superuser, is_deleted,
                      deleted_at, created_at, updated_at
            "#,
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.username)
        .bind(data.email)
        .bind(data.hashed_password)
        .bind(data.role.as_str())
        .bind(data.organization_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a live user by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, uuid, first_name, last_name, username, email, hashed_password,
                   profile_image_url, role, organization_id, is_superuser, is_deleted,
                   deleted_at, created_at, updated_at
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a live user by exact email
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, uuid, first_name, last_name, username, email, hashed_password,
                   profile_image_url, role, organization_id, is_superuser, is_deleted,
                   deleted_at, created_at, updated_at
            FROM users
            WHERE email = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// Finds a live user by username
    pub async fn find_by_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, uuid, first_name, last_name, username, email, hashed_password,
                   profile_image_url, role, organization_id, is_superuser, is_deleted,
                   deleted_at, created_at, updated_at
            FROM users
            WHERE username = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(username)
        .fetch_optional(executor)
        .await
    }

    /// Applies a partial update to a live user
    ///
    /// `None` fields keep their current value. Returns `None` when the user
    /// is missing or deleted.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UserUpdate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                username = COALESCE($4, username),
                email = COALESCE($5, email),
                profile_image_url = COALESCE($6, profile_image_url),
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, uuid, first_name, last_name, username, email, hashed_password,
                      profile_image_url, role, organization_id, is_superuser, is_deleted,
                      deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.username)
        .bind(data.email)
        .bind(data.profile_image_url)
        .fetch_optional(executor)
        .await
    }

    /// Moves a live user to another organization
    pub async fn set_organization<'e, E>(
        executor: E,
        id: i64,
        organization_id: i64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET organization_id = $2, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, uuid, first_name, last_name, username, email, hashed_password,
                      profile_image_url, role, organization_id, is_superuser, is_deleted,
                      deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
    }

    /// Soft-deletes a live user, freeing its email and username
    pub async fn soft_delete<'e, E>(executor: E, id: i64) -> Result<Option<UserDelete>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserDelete>(
            r#"
            UPDATE users
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING is_deleted, deleted_at
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Restores a soft-deleted user
    ///
    /// Fails with a unique violation if its email or username has since been
    /// taken by another live user.
    pub async fn restore<'e, E>(
        executor: E,
        id: i64,
    ) -> Result<Option<UserRestoreDeleted>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserRestoreDeleted>(
            r#"
            UPDATE users
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            RETURNING is_deleted
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Counts live users
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE")
                .fetch_one(executor)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(UserRole::SuperAdmin.as_str(), "super_admin");
        assert_eq!(UserRole::OrgHead.as_str(), "org_head");
        assert_eq!(UserRole::Player.to_string(), "player");

        for role in [UserRole::SuperAdmin, UserRole::OrgHead, UserRole::Player] {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, role.as_str());
            let back: UserRole = serde_json::from_value(json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn test_role_from_stored_name() {
        assert_eq!(
            UserRole::try_from("org_head".to_string()).unwrap(),
            UserRole::OrgHead
        );
        let err = UserRole::try_from("coach".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown user role: coach");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<UserRole>("\"coach\"").is_err());
    }
}
