//! codesnip-core
//!
//! Pure domain types and rules: the snippet and settings models, the HTML
//! sanitization policy, slug derivation and text-field cleanup.
//! No database or HTTP dependency; every other crate builds on these types.

pub mod error;
pub mod models;
pub mod policy;
pub mod slug;
pub mod text;
