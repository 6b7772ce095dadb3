use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use codesnip_auth::{AuthError, Caller};

use crate::error::ApiError;

/// User name asserted by the authenticating reverse proxy.
pub const USER_HEADER: &str = "x-codesnip-user";
/// Comma-separated capability names for that user.
pub const CAPABILITIES_HEADER: &str = "x-codesnip-capabilities";

/// Rejects requests without a caller identity (401) and makes the
/// [`Caller`] available to handlers as a request extension.
pub async fn require_caller(mut req: Request, next: Next) -> Response {
    let caller = match caller_from_headers(req.headers()) {
        Ok(caller) => caller,
        Err(e) => return ApiError::from(e).into_response(),
    };

    req.extensions_mut().insert(caller.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(caller);
    response
}

pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, AuthError> {
    let user = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCaller)?;
    let capabilities = headers
        .get(CAPABILITIES_HEADER)
        .and_then(|v| v.to_str().ok());
    Caller::from_parts(user, capabilities)
}
