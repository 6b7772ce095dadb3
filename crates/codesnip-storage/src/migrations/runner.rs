use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use tracing::info;

use super::{MIGRATIONS, Migration};
use crate::error::StorageError;

/// Apply every pending migration. Returns how many were applied this call.
pub fn apply_migrations(conn: &mut Connection) -> Result<usize, StorageError> {
    create_schema_version_table(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        if apply_migration(conn, migration)? {
            applied += 1;
        }
    }
    Ok(applied)
}

/// Ids of applied migrations, oldest first.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare("SELECT migration_id FROM schema_version ORDER BY id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

fn create_schema_version_table(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<bool, StorageError> {
    let checksum = checksum(migration.sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(StorageError::ChecksumMismatch {
                id: migration.id.to_string(),
            });
        }
        return Ok(false);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| StorageError::Migration {
            id: migration.id,
            message: e.to_string(),
        })?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        params![migration.id, jiff::Timestamp::now().as_second(), checksum],
    )?;
    tx.commit()?;

    info!(migration = migration.id, "applied migration");
    Ok(true)
}

fn checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}
