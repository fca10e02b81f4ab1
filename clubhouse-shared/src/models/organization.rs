/// Organization model and database operations
///
/// Organizations group users. They are soft-deleted: `soft_delete` flips
/// `is_deleted` and stamps `deleted_at`, and every lookup here ignores
/// deleted rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organizations (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::models::organization::Organization;
/// use clubhouse_shared::schemas::organization::OrganizationCreate;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let org = Organization::create(
///     &pool,
///     OrganizationCreate { name: "Night Owls".to_string() },
/// )
/// .await?;
///
/// Organization::soft_delete(&pool, org.id).await?;
/// assert!(Organization::find_by_id(&pool, org.id).await?.is_none());
/// # Ok(())
/// # }
/// ```

use crate::schemas::organization::{OrganizationCreate, OrganizationDelete, OrganizationUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Organization row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Organization {
    /// Inserts a new organization
    pub async fn create<'e, E>(executor: E, data: OrganizationCreate) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at, is_deleted, deleted_at
            "#,
        )
        .bind(data.name)
        .fetch_one(executor)
        .await
    }

    /// Finds a live organization by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, created_at, updated_at, is_deleted, deleted_at
            FROM organizations
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Applies a partial update
    ///
    /// Returns `None` when the organization does not exist or is deleted.
    /// An empty update still bumps `updated_at`.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: OrganizationUpdate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, name, created_at, updated_at, is_deleted, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .fetch_optional(executor)
        .await
    }

    /// Marks an organization deleted
    ///
    /// Returns `None` if it was missing or already deleted.
    pub async fn soft_delete<'e, E>(
        executor: E,
        id: i64,
    ) -> Result<Option<OrganizationDelete>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, OrganizationDelete>(
            r#"
            UPDATE organizations
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING is_deleted, deleted_at
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists live organizations, newest first
    pub async fn list<'e, E>(executor: E, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, created_at, updated_at, is_deleted, deleted_at
            FROM organizations
            WHERE is_deleted = FALSE
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
    }
}
