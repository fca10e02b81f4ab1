/// Subcommand implementations
///
/// Each command returns `anyhow::Result`; a failed check or migration
/// surfaces as an error so the process exits non-zero.

use crate::cli::{Cli, Command};
use anyhow::Context;
use clubhouse_shared::db::migrations::{
    ensure_database_exists, get_migration_status, render_offline_sql, revert_migrations,
    run_migrations, MigrationStatus,
};
use clubhouse_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use clubhouse_shared::db::schema::{check_schema, SchemaDrift};
use clubhouse_shared::settings::PostgresSettings;
use sqlx::PgPool;
use std::path::Path;
use tracing::info;

/// Runs the parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Sql { since, output } => write_offline_sql(since, output.as_deref()),
        Command::CreateDatabase => {
            let url = resolve_database_url(cli.database_url)?;
            ensure_database_exists(&url)
                .await
                .context("failed to create database")?;
            println!("Database is ready");
            Ok(())
        }
        command => {
            let url = resolve_database_url(cli.database_url)?;
            let pool = connect(&url).await?;
            let result = run_online(&pool, &command).await;
            close_pool(pool).await;
            result
        }
    }
}

async fn run_online(pool: &PgPool, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Up => {
            run_migrations(pool).await.context("migration failed")?;
            let status = get_migration_status(pool).await?;
            println!("{}", format_status(&status));
        }
        Command::Status => {
            let status = get_migration_status(pool).await?;
            println!("{}", format_status(&status));
        }
        Command::Check { strict } => {
            let drift = check_schema(pool).await?;
            println!("{}", format_drift(&drift));

            let failing = drift
                .iter()
                .filter(|d| *strict || d.is_breaking())
                .count();
            if failing > 0 {
                anyhow::bail!("schema check failed with {} difference(s)", failing);
            }
        }
        Command::Revert { target } => {
            revert_migrations(pool, *target)
                .await
                .with_context(|| format!("failed to revert to version {}", target))?;
            let status = get_migration_status(pool).await?;
            println!("{}", format_status(&status));
        }
        Command::Sql { .. } | Command::CreateDatabase => {
            anyhow::bail!("{:?} does not run against a pool", command)
        }
    }

    Ok(())
}

/// `--database-url` / `DATABASE_URL` wins; otherwise the `POSTGRES_*` settings
pub fn resolve_database_url(explicit: Option<String>) -> anyhow::Result<String> {
    match explicit {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => {
            let settings = PostgresSettings::from_env()
                .context("no --database-url given and POSTGRES_* settings are incomplete")?;
            info!(url = %settings.redacted_url(), "Using POSTGRES_* settings");
            Ok(settings.url()?)
        }
    }
}

async fn connect(url: &str) -> anyhow::Result<PgPool> {
    create_pool(DatabaseConfig {
        url: url.to_string(),
        max_connections: 2,
        min_connections: 1,
        acquire_timeout_seconds: 5,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")
}

fn write_offline_sql(since: Option<i64>, output: Option<&Path>) -> anyhow::Result<()> {
    let script = render_offline_sql(since);

    match output {
        Some(path) => {
            std::fs::write(path, &script)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Offline migration script written");
        }
        None => print!("{}", script),
    }

    Ok(())
}

pub fn format_status(status: &MigrationStatus) -> String {
    let latest = status
        .latest_version
        .map_or_else(|| "none".to_string(), |v| v.to_string());

    format!(
        "applied: {}\nlatest:  {}\npending: {}\nstate:   {}",
        status.applied_migrations,
        latest,
        status.pending_migrations,
        if status.is_up_to_date { "up to date" } else { "behind" },
    )
}

pub fn format_drift(drift: &[SchemaDrift]) -> String {
    if drift.is_empty() {
        return "Schema matches the models".to_string();
    }

    drift
        .iter()
        .map(|d| {
            let marker = if d.is_breaking() { "ERROR" } else { "note " };
            format!("{} {}", marker, d)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
