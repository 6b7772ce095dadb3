use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;
use crate::{migrations, settings};

/// Open (or create) the database file at `path`.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection, StorageError> {
    Ok(Connection::open(path)?)
}

pub fn open_in_memory() -> Result<Connection, StorageError> {
    Ok(Connection::open_in_memory()?)
}

/// Connection pragmas. In-memory databases silently stay in `memory`
/// journal mode.
pub fn configure(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

/// Bring a fresh or existing database up to date: pragmas, pending
/// migrations, then any missing default settings.
pub fn init(conn: &mut Connection) -> Result<(), StorageError> {
    configure(conn)?;
    let applied = migrations::apply_migrations(conn)?;
    settings::install_defaults(conn)?;
    info!(applied, "database ready");
    Ok(())
}
