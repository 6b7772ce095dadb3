use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use codesnip_auth::Caller;
use codesnip_core::models::snippet::{Snippet, SnippetId, SnippetSummary};
use codesnip_core::policy::sanitize_snippet;
use codesnip_core::text::sanitize_text_field;
use codesnip_storage::snippets;

use super::{Envelope, IdError, RpcResult, parse_id, parse_status, verify_nonce};
use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveRequest {
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdRequest {
    pub snippet_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub snippet_id: Option<Value>,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToggleRequest {
    pub snippet_id: Option<Value>,
    pub status: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct Saved {
    pub id: SnippetId,
}

fn invalid_id() -> ApiError {
    ApiError::validation(StatusCode::BAD_REQUEST, "Invalid snippet ID")
}

pub async fn save(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> RpcResult<Saved> {
    verify_nonce(&state, &caller, &headers).keyed("common")?;
    let Json(req) = body.map_err(ApiError::bad_body).keyed("common")?;

    let code_required =
        || ApiError::validation(StatusCode::FORBIDDEN, "Code must required").with_field("snippet");

    if req.snippet.trim().is_empty() {
        return Err(code_required());
    }
    let markup = sanitize_snippet(&req.snippet)?;
    if markup.is_blank() {
        return Err(code_required());
    }

    let title = sanitize_text_field(&req.title);
    if title.is_empty() {
        return Err(
            ApiError::validation(StatusCode::FORBIDDEN, "Title must required").with_field("title"),
        );
    }

    let id = {
        let conn = state.db.lock().await;
        snippets::create_snippet(&conn, &title, &markup)
            .map_err(|e| ApiError::storage(e, "Failed to save snippet"))
            .keyed("common")?
    };

    Ok(Envelope::with_message(
        "Snippet saved successfully!",
        Saved { id },
    ))
}

pub async fn get_all(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
) -> RpcResult<Vec<SnippetSummary>> {
    verify_nonce(&state, &caller, &headers)?;

    let conn = state.db.lock().await;
    let rows = snippets::list_snippets(&conn)
        .map_err(|e| ApiError::storage(e, "Snippets not found"))?;
    Ok(Envelope::data(rows))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> RpcResult<Snippet> {
    verify_nonce(&state, &caller, &headers)?;
    let Json(req) = body.map_err(ApiError::bad_body)?;
    let id = parse_id(req.snippet_id.as_ref()).map_err(|_| invalid_id())?;

    let conn = state.db.lock().await;
    let snippet = snippets::get_snippet(&conn, id)
        .map_err(|e| ApiError::storage(e, "Failed to load snippet"))?;
    Ok(Envelope::data(snippet))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> RpcResult<()> {
    verify_nonce(&state, &caller, &headers).keyed("common")?;
    let Json(req) = body.map_err(ApiError::bad_body).keyed("common")?;

    let id = match parse_id(req.snippet_id.as_ref()) {
        Ok(id) => id,
        Err(IdError::Missing) => {
            return Err(ApiError::validation(StatusCode::FORBIDDEN, "Invalid snippet ID")
                .with_field("common"));
        }
        Err(IdError::Invalid) => return Err(invalid_id().with_field("common")),
    };

    let title = sanitize_text_field(&req.title);
    if title.is_empty() {
        return Err(
            ApiError::validation(StatusCode::BAD_REQUEST, "Title is required").with_field("title"),
        );
    }
    if req.snippet.trim().is_empty() {
        return Err(
            ApiError::validation(StatusCode::BAD_REQUEST, "Snippet content is required")
                .with_field("snippet"),
        );
    }
    let markup = sanitize_snippet(&req.snippet)?;

    let conn = state.db.lock().await;
    snippets::update_snippet(&conn, id, &title, &markup)
        .map_err(|e| ApiError::storage(e, "Failed to update snippet"))
        .keyed("common")?;

    Ok(Envelope::message("Snippet updated successfully"))
}

pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> RpcResult<()> {
    verify_nonce(&state, &caller, &headers)?;
    let Json(req) = body.map_err(ApiError::bad_body)?;

    // Status is checked before the id.
    let active = parse_status(req.status.as_ref())
        .ok_or_else(|| ApiError::validation(StatusCode::BAD_REQUEST, "Invalid status"))?;
    let id = match parse_id(req.snippet_id.as_ref()) {
        Ok(id) => id,
        Err(IdError::Missing) => {
            return Err(ApiError::validation(
                StatusCode::BAD_REQUEST,
                "Invalid snippet ID or status",
            ));
        }
        Err(IdError::Invalid) => return Err(invalid_id()),
    };

    let conn = state.db.lock().await;
    snippets::set_status(&conn, id, active)
        .map_err(|e| ApiError::storage(e, "Failed to update status"))?;

    Ok(Envelope::message("Status updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> RpcResult<()> {
    verify_nonce(&state, &caller, &headers)?;
    let Json(req) = body.map_err(ApiError::bad_body)?;
    let id = parse_id(req.snippet_id.as_ref()).map_err(|_| invalid_id())?;

    let conn = state.db.lock().await;
    snippets::delete_snippet(&conn, id)
        .map_err(|e| ApiError::storage(e, "Failed to delete snippet"))?;

    Ok(Envelope::message("Snippet deleted successfully"))
}
