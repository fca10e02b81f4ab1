/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded migrations, online and offline runners
/// - `schema`: declared table metadata and drift detection
///
/// Models are in the `models` module at crate root level.
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::db::pool::{create_pool, DatabaseConfig};
/// use clubhouse_shared::settings::PostgresSettings;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = PostgresSettings::from_env()?;
///     let pool = create_pool(DatabaseConfig {
///         url: settings.url()?,
///         ..Default::default()
///     })
///     .await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod schema;
