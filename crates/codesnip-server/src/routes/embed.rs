use axum::extract::{Path, State};
use axum::response::Html;

use crate::embed::{expand_tokens, leading_int, resolve};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /embed/{id}`: a single snippet as the content pipeline would
/// render it.
pub async fn embed_snippet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let conn = state.db.lock().await;
    let html = resolve(&conn, leading_int(&id))
        .map_err(|e| ApiError::storage(e, "Failed to load snippet"))?;
    Ok(Html(html))
}

/// `POST /render`: expand every embed token in a content body.
pub async fn render_content(
    State(state): State<AppState>,
    content: String,
) -> Result<Html<String>, ApiError> {
    let conn = state.db.lock().await;
    let html = expand_tokens(&conn, &content)
        .map_err(|e| ApiError::storage(e, "Failed to render content"))?;
    Ok(Html(html))
}
