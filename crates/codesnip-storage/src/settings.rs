//! Model settings persisted as independent rows of the `options` table.

use codesnip_core::models::settings::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, Settings};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::error::StorageError;

pub const API_KEY_OPTION: &str = "codesnip_openai_api_key";
pub const MODEL_OPTION: &str = "codesnip_openai_model";
pub const MAX_TOKENS_OPTION: &str = "codesnip_openai_max_tokens";

/// Current settings. Missing rows fall back to defaults, and an unparsable
/// token budget reads as the default budget.
pub fn load_settings(conn: &Connection) -> Result<Settings, StorageError> {
    let defaults = Settings::default();
    let api_key = get_option(conn, API_KEY_OPTION)?.unwrap_or(defaults.api_key);
    let model = get_option(conn, MODEL_OPTION)?
        .filter(|m| !m.is_empty())
        .unwrap_or(defaults.model);
    let max_tokens = get_option(conn, MAX_TOKENS_OPTION)?
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(defaults.max_tokens);

    Ok(Settings {
        api_key,
        model,
        max_tokens,
    })
}

/// Overwrite all three values in one transaction.
pub fn save_settings(conn: &mut Connection, settings: &Settings) -> Result<(), StorageError> {
    let tx = conn.transaction()?;
    put_option(&tx, API_KEY_OPTION, &settings.api_key)?;
    put_option(&tx, MODEL_OPTION, &settings.model)?;
    put_option(&tx, MAX_TOKENS_OPTION, &settings.max_tokens.to_string())?;
    tx.commit()?;

    info!(model = %settings.model, max_tokens = settings.max_tokens, "settings saved");
    Ok(())
}

/// Fill in defaults for any option not yet present. Existing values are
/// left alone.
pub fn install_defaults(conn: &Connection) -> Result<(), StorageError> {
    let max_tokens = DEFAULT_MAX_TOKENS.to_string();
    for (name, value) in [
        (API_KEY_OPTION, ""),
        (MODEL_OPTION, DEFAULT_MODEL),
        (MAX_TOKENS_OPTION, max_tokens.as_str()),
    ] {
        conn.execute(
            "INSERT OR IGNORE INTO options (name, value) VALUES (?1, ?2)",
            params![name, value],
        )?;
    }
    Ok(())
}

fn get_option(conn: &Connection, name: &str) -> Result<Option<String>, StorageError> {
    let value = conn
        .query_row("SELECT value FROM options WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn put_option(conn: &Connection, name: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO options (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, value],
    )?;
    Ok(())
}
