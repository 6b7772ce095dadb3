//! `[codesnip id="N"]` tokens in content bodies.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use rusqlite::Connection;

use codesnip_storage::StorageError;
use codesnip_storage::snippets::embed_row;

pub const NOT_FOUND_TEXT: &str = "Snippet not found.";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[codesnip(\s[^\]]*)?\]").expect("static pattern"));

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#)
        .expect("static pattern")
});

/// Output for one embed: the stored markup when active, nothing when
/// inactive, a fixed notice when the id matches no snippet.
pub fn resolve(conn: &Connection, id: i64) -> Result<String, StorageError> {
    Ok(match embed_row(conn, id)? {
        None => NOT_FOUND_TEXT.to_string(),
        Some((_, false)) => String::new(),
        Some((markup, true)) => markup,
    })
}

/// Replace every embed token in `content` with its resolved output.
pub fn expand_tokens(conn: &Connection, content: &str) -> Result<String, StorageError> {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in TOKEN.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&content[last..whole.start()]);
        out.push_str(&resolve(conn, token_id(&caps))?);
        last = whole.end();
    }
    out.push_str(&content[last..]);
    Ok(out)
}

/// The `id` attribute of a token; 0 when absent or not a number.
fn token_id(caps: &Captures<'_>) -> i64 {
    let Some(attrs) = caps.get(1) else { return 0 };
    ID_ATTR
        .captures(attrs.as_str())
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map_or(0, |m| leading_int(m.as_str()))
}

/// Integer prefix of `s` (`"12abc"` → 12), or 0.
pub fn leading_int(s: &str) -> i64 {
    let s = s.trim();
    let digits_end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..digits_end].parse().unwrap_or(0)
}
