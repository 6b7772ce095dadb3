use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

use codesnip_auth::Caller;
use codesnip_core::policy::check_disallowed;
use codesnip_core::text::sanitize_textarea_field;
use codesnip_openai::completion::suggest;
use codesnip_openai::prompt::build_prompt;
use codesnip_storage::settings::load_settings;

use super::{Envelope, RpcResult, verify_nonce};
use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

/// Longest accepted instruction, in characters.
pub const MAX_PROMPT_CHARS: usize = 10_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssistRequest {
    pub prompt: String,
    pub snippet: String,
}

/// Ask the model to rework a snippet. Returns the filtered suggestion; the
/// editor decides whether to keep it.
pub async fn assist(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<AssistRequest>, JsonRejection>,
) -> RpcResult<String> {
    verify_nonce(&state, &caller, &headers).keyed("prompt")?;
    let Json(req) = body.map_err(ApiError::bad_body).keyed("prompt")?;

    let instruction = sanitize_textarea_field(&req.prompt);
    if instruction.is_empty() {
        return Err(
            ApiError::validation(StatusCode::FORBIDDEN, "Prompt must required").with_field("prompt"),
        );
    }
    if instruction.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::validation(
            StatusCode::BAD_REQUEST,
            "Invalid prompt or max length 10000 characters",
        )
        .with_field("prompt"));
    }
    if req.snippet.trim().is_empty() {
        return Err(
            ApiError::validation(StatusCode::FORBIDDEN, "Code snippet must required")
                .with_field("prompt"),
        );
    }
    check_disallowed(&req.snippet)?;

    // Released before the network call.
    let settings = {
        let conn = state.db.lock().await;
        load_settings(&conn)
            .map_err(|e| ApiError::storage(e, "Failed to load settings"))
            .keyed("prompt")?
    };

    let prompt = build_prompt(&instruction, &req.snippet);
    let suggestion = suggest(&state.http, &state.openai_base_url, &settings, &prompt)
        .await
        .keyed("prompt")?;

    tracing::info!(user = %caller.user, chars = suggestion.len(), "assist suggestion returned");
    Ok(Envelope::with_message("Successfully!", suggestion))
}
