use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Store-assigned identifier of a snippet. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SnippetId(i64);

impl SnippetId {
    pub fn new(raw: i64) -> Result<Self, CoreError> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(CoreError::InvalidSnippetId(raw.to_string()))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for SnippetId {
    type Error = CoreError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SnippetId> for i64 {
    fn from(id: SnippetId) -> Self {
        id.0
    }
}

impl FromStr for SnippetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw: i64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidSnippetId(trimmed.to_string()))?;
        Self::new(raw)
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored snippet: sanitized markup plus its title, slug and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Snippet {
    #[ts(type = "number")]
    pub id: SnippetId,
    pub title: String,
    pub snippet: String,
    pub slug: String,
    #[serde(with = "status_flag")]
    #[ts(type = "number")]
    pub status: bool,
    pub created_at: jiff::Timestamp,
}

/// Listing row: a snippet without its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnippetSummary {
    #[ts(type = "number")]
    pub id: SnippetId,
    pub title: String,
    pub slug: String,
    #[serde(with = "status_flag")]
    #[ts(type = "number")]
    pub status: bool,
    pub created_at: jiff::Timestamp,
}

/// Active/inactive flags travel as `0`/`1`.
pub mod status_flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(active: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*active))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("invalid status flag: {other}"))),
        }
    }
}
