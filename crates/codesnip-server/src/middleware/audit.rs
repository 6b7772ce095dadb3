use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use codesnip_auth::Caller;

use crate::error::ErrorKind;

/// One `api_request` event per request. The user is only known on routes
/// behind the caller middleware, which copies it onto the response.
pub async fn audit_log(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let route = req.uri().path().to_owned();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let user = response.extensions().get::<Caller>().map(|c| c.user.as_str());
    let error_kind = response.extensions().get::<ErrorKind>().map(|k| k.as_str());

    if status.is_server_error() {
        tracing::warn!(%method, path = %route, status = status.as_u16(), elapsed_ms, user, error_kind, "api_request");
    } else {
        tracing::info!(%method, path = %route, status = status.as_u16(), elapsed_ms, user, error_kind, "api_request");
    }

    response
}
