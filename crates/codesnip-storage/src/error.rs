use codesnip_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snippet not found: {id}")]
    NotFound { id: i64 },

    #[error("no free slug for title {title:?} after {attempts} attempts")]
    SlugConflict { title: String, attempts: usize },

    #[error("migration {id} failed: {message}")]
    Migration { id: &'static str, message: String },

    #[error("migration {id} was modified after it was applied")]
    ChecksumMismatch { id: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
