//! # Clubhouse Migration Runner
//!
//! ```bash
//! cargo run -p clubhouse-migrate -- up
//! cargo run -p clubhouse-migrate -- sql --since 20250101000000 > upgrade.sql
//! ```

use clap::Parser;
use clubhouse_migrate::{cli::Cli, commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `sql` output can be piped
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse_migrate=info,clubhouse_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "Starting clubhouse-migrate v{}", env!("CARGO_PKG_VERSION"));

    commands::run(cli).await
}
