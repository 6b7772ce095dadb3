use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use codesnip_auth::Caller;

use crate::admin::render_admin;
use crate::error::{ApiError, ErrorKind};
use crate::state::AppState;

pub async fn admin_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Html<String>, ApiError> {
    let html = render_admin(&state.templates, &state.nonces, &caller).map_err(|e| {
        tracing::error!(error = %e, "admin page render failed");
        ApiError::new(
            ErrorKind::Config,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to render admin page",
        )
    })?;
    Ok(Html(html))
}
