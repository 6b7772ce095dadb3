//! Snippet rows.
//!
//! Bodies enter only as [`SanitizedHtml`], so nothing in this module checks
//! markup. Slugs are derived here from the title on every create and update.

use codesnip_core::models::snippet::{Snippet, SnippetId, SnippetSummary};
use codesnip_core::policy::SanitizedHtml;
use codesnip_core::slug::unique_slug;
use jiff::Timestamp;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{info, warn};

use crate::error::StorageError;

/// Writes that lose a slug race re-derive the slug this many times.
const SLUG_ATTEMPTS: usize = 5;

/// Insert an active snippet and return its id.
pub fn create_snippet(
    conn: &Connection,
    title: &str,
    body: &SanitizedHtml,
) -> Result<SnippetId, StorageError> {
    let created_at = Timestamp::now().as_second();
    let slug = with_unique_slug(conn, title, None, |slug| {
        conn.execute(
            "INSERT INTO snippets (title, slug, snippet, status, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![title, slug, body.as_str(), created_at],
        )
    })?;

    let id = SnippetId::new(conn.last_insert_rowid())?;
    info!(%id, slug = %slug, "snippet created");
    Ok(id)
}

/// All snippets without bodies, newest first.
pub fn list_snippets(conn: &Connection) -> Result<Vec<SnippetSummary>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, slug, status, created_at
         FROM snippets
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SnippetSummary {
                id: id_column(row, 0)?,
                title: row.get(1)?,
                slug: row.get(2)?,
                status: row.get(3)?,
                created_at: timestamp_column(row, 4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_snippet(conn: &Connection, id: SnippetId) -> Result<Snippet, StorageError> {
    conn.query_row(
        "SELECT id, title, snippet, slug, status, created_at FROM snippets WHERE id = ?1",
        [id.get()],
        |row| {
            Ok(Snippet {
                id: id_column(row, 0)?,
                title: row.get(1)?,
                snippet: row.get(2)?,
                slug: row.get(3)?,
                status: row.get(4)?,
                created_at: timestamp_column(row, 5)?,
            })
        },
    )
    .optional()?
    .ok_or(StorageError::NotFound { id: id.get() })
}

/// Overwrite title, slug and body. Status and creation time are untouched.
///
/// The slug is derived again from `title`. The row's own slug does not count
/// as a collision, but a lower suffix freed since the last write is taken, so
/// `hello-1` becomes `hello` once `hello` is gone.
pub fn update_snippet(
    conn: &Connection,
    id: SnippetId,
    title: &str,
    body: &SanitizedHtml,
) -> Result<(), StorageError> {
    let mut touched = 0;
    let slug = with_unique_slug(conn, title, Some(id), |slug| {
        touched = conn.execute(
            "UPDATE snippets SET title = ?1, slug = ?2, snippet = ?3 WHERE id = ?4",
            params![title, slug, body.as_str(), id.get()],
        )?;
        Ok(touched)
    })?;

    if touched == 0 {
        return Err(StorageError::NotFound { id: id.get() });
    }
    info!(%id, slug = %slug, "snippet updated");
    Ok(())
}

pub fn set_status(conn: &Connection, id: SnippetId, active: bool) -> Result<(), StorageError> {
    let touched = conn.execute(
        "UPDATE snippets SET status = ?1 WHERE id = ?2",
        params![active, id.get()],
    )?;
    if touched == 0 {
        return Err(StorageError::NotFound { id: id.get() });
    }
    info!(%id, active, "snippet status changed");
    Ok(())
}

pub fn delete_snippet(conn: &Connection, id: SnippetId) -> Result<(), StorageError> {
    let touched = conn.execute("DELETE FROM snippets WHERE id = ?1", [id.get()])?;
    if touched == 0 {
        return Err(StorageError::NotFound { id: id.get() });
    }
    info!(%id, "snippet deleted");
    Ok(())
}

/// Whether `slug` is taken by any row other than `exclude`.
pub fn slug_exists(
    conn: &Connection,
    slug: &str,
    exclude: Option<SnippetId>,
) -> Result<bool, StorageError> {
    let exclude = exclude.map_or(0, SnippetId::get);
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM snippets WHERE slug = ?1 AND id != ?2)",
        params![slug, exclude],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Markup and active flag for an embed lookup. Ids that can never exist
/// (zero, negative) simply miss.
pub fn embed_row(conn: &Connection, id: i64) -> Result<Option<(String, bool)>, StorageError> {
    let row = conn
        .query_row(
            "SELECT snippet, status FROM snippets WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

/// Derive a free slug and hand it to `write`. A unique-index violation on
/// `slug` means another writer took it in between, so derive again.
fn with_unique_slug<F>(
    conn: &Connection,
    title: &str,
    exclude: Option<SnippetId>,
    mut write: F,
) -> Result<String, StorageError>
where
    F: FnMut(&str) -> rusqlite::Result<usize>,
{
    for attempt in 1..=SLUG_ATTEMPTS {
        let slug = unique_slug(title, |candidate| slug_exists(conn, candidate, exclude))?;
        match write(&slug) {
            Ok(_) => return Ok(slug),
            Err(err) if is_slug_conflict(&err) => {
                warn!(slug = %slug, attempt, "slug taken by a concurrent write, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(StorageError::SlugConflict {
        title: title.to_string(),
        attempts: SLUG_ATTEMPTS,
    })
}

fn is_slug_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message)) => {
            e.code == ErrorCode::ConstraintViolation && message.contains("snippets.slug")
        }
        _ => false,
    }
}

fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<SnippetId> {
    let raw: i64 = row.get(idx)?;
    SnippetId::new(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let secs: i64 = row.get(idx)?;
    Timestamp::from_second(secs)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
