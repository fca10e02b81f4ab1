//! # Clubhouse Shared Library
//!
//! Types and data access shared by the Clubhouse API server and the
//! migration runner.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing
//! - `db`: connection pool, migrations, schema drift checks
//! - `models`: database rows and their queries
//! - `schemas`: validated request and response shapes
//! - `settings`: environment-derived PostgreSQL settings

pub mod auth;
pub mod db;
pub mod models;
pub mod schemas;
pub mod settings;

/// Current version of the Clubhouse shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
