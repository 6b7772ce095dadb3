//! Schema migrations.
//!
//! SQL files under `migrations/` are embedded at compile time and applied in
//! order. Each applied migration is recorded in `schema_version` with a
//! SHA-256 checksum of its text.

mod runner;

pub use runner::{apply_migrations, applied_migrations};

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "0001_initial_schema",
    sql: include_str!("../../migrations/0001_initial_schema.sql"),
}];
