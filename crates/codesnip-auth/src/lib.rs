//! codesnip-auth
//!
//! Anti-forgery tokens for state-changing requests and the caller identity
//! that admin requests carry.

pub mod caller;
pub mod error;
pub mod nonce;

pub use caller::{Caller, Capability};
pub use error::AuthError;
pub use nonce::{NONCE_ACTION, NonceAge, NonceSigner};
