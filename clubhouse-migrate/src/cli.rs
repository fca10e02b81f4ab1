/// Command line definition
///
/// ```text
/// clubhouse-migrate [--database-url URL] <COMMAND>
///
///   up                     apply pending migrations
///   sql [--since V] [-o F] print the offline upgrade script
///   status                 applied / pending counts
///   check [--strict]       diff models against the live schema
///   revert --target V      undo migrations newer than V (0 = all)
///   create-database        create the database if missing
/// ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clubhouse-migrate")]
#[command(about = "Clubhouse database migration runner")]
#[command(version)]
pub struct Cli {
    /// Connection URL; defaults to one built from the POSTGRES_* settings
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Apply pending migrations to the live database
    Up,

    /// Print pending migrations as one SQL script without connecting
    Sql {
        /// Last version already applied on the target; omit for an empty database
        #[arg(long)]
        since: Option<i64>,

        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show applied and pending migration counts
    Status,

    /// Compare the tables the models use against the live schema
    Check {
        /// Fail on undeclared columns too
        #[arg(long)]
        strict: bool,
    },

    /// Undo applied migrations newer than the target version
    Revert {
        /// Version to keep; 0 reverts everything
        #[arg(long)]
        target: i64,
    },

    /// Create the database if it does not exist
    CreateDatabase,
}
