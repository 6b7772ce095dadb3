//! codesnip-storage
//!
//! SQLite persistence for snippets and model settings. Every function takes a
//! borrowed `rusqlite::Connection`; callers own locking.

pub mod db;
pub mod error;
pub mod migrations;
pub mod settings;
pub mod snippets;

pub use error::StorageError;
