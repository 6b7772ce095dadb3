//! codesnip-openai
//!
//! Chat-completion calls used by the editor's AI assist: prompt assembly,
//! one HTTP round trip, and provider error mapping.

pub mod client;
pub mod completion;
pub mod error;
pub mod prompt;

pub use error::CompletionError;
