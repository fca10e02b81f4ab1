/// Database models
///
/// - `organization`: organizations users belong to
/// - `user`: user accounts
///
/// Both tables are soft-deleted; lookups here only return live rows.
///
/// # Example
///
/// ```no_run
/// use clubhouse_shared::models::user::User;
/// use clubhouse_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// println!("{} live users", User::count(&pool).await?);
/// # Ok(())
/// # }
/// ```

pub mod organization;
pub mod user;
