/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded at compile time. Each one is a reversible pair:
/// - `{version}_{name}.up.sql`
/// - `{version}_{name}.down.sql`
///
/// Two ways to apply them:
/// - **online**: [`run_migrations`] against a live pool; applied versions are
///   recorded in `_sqlx_migrations`
/// - **offline**: [`render_offline_sql`] produces a standalone SQL script
///   (including the `_sqlx_migrations` bookkeeping) for a DBA to review and run
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::db::pool::{create_pool, DatabaseConfig};
/// use clubhouse_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///     Ok(())
/// }
/// ```

use sqlx::migrate::{MigrateDatabase, MigrateError, Migration, MigrationType, Migrator};
use sqlx::{postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Bookkeeping table DDL, matching what sqlx creates online
const MIGRATIONS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS _sqlx_migrations (
    version BIGINT PRIMARY KEY,
    description TEXT NOT NULL,
    installed_on TIMESTAMPTZ NOT NULL DEFAULT now(),
    success BOOLEAN NOT NULL,
    checksum BYTEA NOT NULL,
    execution_time BIGINT NOT NULL
);";

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations recorded as applied
    pub applied_migrations: usize,

    /// Latest applied version
    pub latest_version: Option<i64>,

    /// Up migrations known to this build but not applied yet
    pub pending_migrations: usize,

    /// Whether every known migration has been applied
    pub is_up_to_date: bool,
}

/// Up migrations known to this build, in version order
pub fn up_migrations() -> impl Iterator<Item = &'static Migration> {
    MIGRATOR
        .iter()
        .filter(|m| !matches!(m.migration_type, MigrationType::ReversibleDown))
}

/// Up migrations newer than `since` (all of them when `since` is `None`)
pub fn pending_migrations(since: Option<i64>) -> Vec<&'static Migration> {
    up_migrations()
        .filter(|m| since.map_or(true, |applied| m.version > applied))
        .collect()
}

/// Applies all pending migrations against a live database
///
/// Each migration runs in its own transaction; a failure leaves earlier
/// migrations applied and returns the error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!("Starting database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Reverts applied migrations newer than `target`
///
/// `target = 0` reverts everything.
pub async fn revert_migrations(pool: &PgPool, target: i64) -> Result<(), MigrateError> {
    info!(target, "Reverting database migrations");

    match MIGRATOR.undo(pool, target).await {
        Ok(()) => {
            info!(target, "Migrations reverted");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, target, "Migration revert failed");
            Err(e)
        }
    }
}

/// Reads `_sqlx_migrations` and compares it with the embedded migrations
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(status_from(0, None));
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version)
         FROM _sqlx_migrations
         WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(status_from(count.max(0) as usize, latest_version))
}

fn status_from(applied_migrations: usize, latest_version: Option<i64>) -> MigrationStatus {
    let pending_migrations = pending_migrations(latest_version).len();

    MigrationStatus {
        applied_migrations,
        latest_version,
        pending_migrations,
        is_up_to_date: pending_migrations == 0,
    }
}

/// Renders pending migrations as one offline SQL script
///
/// The script creates the bookkeeping table if needed, then for each up
/// migration newer than `since` emits its SQL followed by the
/// `_sqlx_migrations` row an online run would have written, so a later
/// online run sees the migration as applied. Everything is wrapped in a
/// single transaction.
pub fn render_offline_sql(since: Option<i64>) -> String {
    let pending = pending_migrations(since);
    let mut script = String::new();

    script.push_str("-- Clubhouse schema migration script\n");
    match since {
        Some(version) => script.push_str(&format!("-- Upgrading from version {}\n", version)),
        None => script.push_str("-- Upgrading from an empty database\n"),
    }
    script.push_str(&format!("-- {} migration(s)\n\n", pending.len()));

    script.push_str("BEGIN;\n\n");
    script.push_str(MIGRATIONS_TABLE_DDL);
    script.push_str("\n\n");

    for migration in pending {
        script.push_str(&format!(
            "-- Running upgrade {} ({})\n\n",
            migration.version, migration.description
        ));
        script.push_str(migration.sql.trim_end());
        script.push_str("\n\n");
        script.push_str(&format!(
            "INSERT INTO _sqlx_migrations (version, description, success, checksum, execution_time)\n\
             VALUES ({}, '{}', TRUE, '\\x{}', 0);\n\n",
            migration.version,
            migration.description.replace('\'', "''"),
            hex::encode(&migration.checksum),
        ));
    }

    script.push_str("COMMIT;\n");
    script
}

/// Creates the database if it doesn't exist
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

/// Drops the database and everything in it
///
/// For test and development databases only.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    warn!("Dropping database");

    if Postgres::database_exists(database_url).await? {
        Postgres::drop_database(database_url).await?;
        info!("Database dropped successfully");
    } else {
        debug!("Database does not exist, nothing to drop");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_reversible_pairs() {
        let ups: Vec<i64> = up_migrations().map(|m| m.version).collect();
        let downs: Vec<i64> = MIGRATOR
            .iter()
            .filter(|m| matches!(m.migration_type, MigrationType::ReversibleDown))
            .map(|m| m.version)
            .collect();

        assert!(!ups.is_empty());
        assert_eq!(ups, downs);

        let mut sorted = ups.clone();
        sorted.sort_unstable();
        assert_eq!(ups, sorted, "migrations should be in version order");
    }

    #[test]
    fn test_pending_migrations_filters_applied() {
        let all = pending_migrations(None);
        let first = all[0].version;

        let rest = pending_migrations(Some(first));
        assert_eq!(rest.len(), all.len() - 1);
        assert!(rest.iter().all(|m| m.version > first));

        let latest = all.last().map(|m| m.version);
        assert!(pending_migrations(latest).is_empty());
    }

    #[test]
    fn test_status_from_counts_pending() {
        let status = status_from(0, None);
        assert_eq!(status.applied_migrations, 0);
        assert_eq!(status.pending_migrations, up_migrations().count());
        assert!(!status.is_up_to_date);

        let latest = up_migrations().last().map(|m| m.version);
        let status = status_from(up_migrations().count(), latest);
        assert_eq!(status.pending_migrations, 0);
        assert!(status.is_up_to_date);
    }

    #[test]
    fn test_offline_sql_contains_every_migration() {
        let script = render_offline_sql(None);

        assert!(script.starts_with("-- Clubhouse schema migration script"));
        assert!(script.contains("BEGIN;"));
        assert!(script.trim_end().ends_with("COMMIT;"));
        assert!(script.contains("CREATE TABLE IF NOT EXISTS _sqlx_migrations"));
        assert!(script.contains("CREATE TABLE organizations"));
        assert!(script.contains("CREATE TABLE users"));
        assert!(!script.contains("DROP TABLE"), "down migrations must not be emitted");

        for migration in up_migrations() {
            assert!(script.contains(&format!("-- Running upgrade {}", migration.version)));
            assert!(script.contains(&format!("VALUES ({},", migration.version)));
        }

        // Organizations must exist before users reference them.
        let orgs = script.find("CREATE TABLE organizations").unwrap();
        let users = script.find("CREATE TABLE users").unwrap();
        assert!(orgs < users);
    }

    #[test]
    fn test_offline_sql_since_latest_is_empty() {
        let latest = up_migrations().last().map(|m| m.version);
        let script = render_offline_sql(latest);

        assert!(script.contains("-- 0 migration(s)"));
        assert!(!script.contains("Running upgrade"));
        assert!(script.contains("COMMIT;"));
    }
}
