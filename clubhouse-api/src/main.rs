//! # Clubhouse API Server
//!
//! Serves signup, login and user/organization maintenance over HTTP.
//! Migrations are applied separately with `clubhouse-migrate`; on startup
//! the server only reports whether the schema is current.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p clubhouse-api
//! ```

use clubhouse_api::{
    app::{build_router, AppState},
    config::Config,
};
use clubhouse_shared::db::{
    migrations::get_migration_status,
    pool::{close_pool, create_pool, DatabaseConfig},
    schema::check_schema,
};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Clubhouse API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    report_schema(&pool).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// `LOG_FORMAT=json` switches to one JSON object per line
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clubhouse_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Warns about pending migrations and breaking schema drift
async fn report_schema(pool: &PgPool) -> anyhow::Result<()> {
    let status = get_migration_status(pool).await?;
    if status.is_up_to_date {
        tracing::info!(
            applied = status.applied_migrations,
            latest_version = ?status.latest_version,
            "Database schema is up to date"
        );
    } else {
        tracing::warn!(
            pending = status.pending_migrations,
            "Database has pending migrations; run `clubhouse-migrate up`"
        );
    }

    let breaking = check_schema(pool)
        .await?
        .iter()
        .filter(|drift| drift.is_breaking())
        .count();
    if breaking > 0 {
        tracing::warn!(breaking, "Live schema does not match the models");
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
