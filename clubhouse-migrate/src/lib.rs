//! # Clubhouse Migration Runner
//!
//! Applies the embedded migrations against a live database, renders them
//! as an offline SQL script, and reports schema status and drift.
//!
//! ## Modules
//!
//! - `cli`: command line definition
//! - `commands`: one function per subcommand

pub mod cli;
pub mod commands;
