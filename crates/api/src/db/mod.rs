//! Database schema, migrations, and query builders.
//!
//! Builders return `(sql, values)` pairs; the server binds the values to
//! its SQLite connection.

pub mod ai_usage;
pub mod analytics;
pub mod chat;
pub mod email;
pub mod job_runs;
pub mod migrations;
pub mod stats;
pub mod tables;
pub mod team_members;
pub mod unsubscribe;
pub mod users;

// Re-export tables for convenience
pub use tables::*;

/// A built statement: SQL text plus its positional values.
pub type Built = (String, sea_query::Values);
