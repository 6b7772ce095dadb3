use thiserror::Error;

use crate::caller::Capability;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid nonce")]
    InvalidNonce,

    #[error("caller identity missing")]
    MissingCaller,

    #[error("Insufficient permissions")]
    Forbidden { required: Capability },

    #[error("nonce secret must not be empty")]
    EmptySecret,
}
