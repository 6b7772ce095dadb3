use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

use codesnip_auth::{Caller, Capability};
use codesnip_core::models::settings::{DEFAULT_MAX_TOKENS, Settings};
use codesnip_core::text::sanitize_text_field;
use codesnip_storage::settings as store;

use super::{Envelope, RpcResult, int_value, verify_nonce};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsRequest {
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<Value>,
}

pub async fn save_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<SettingsRequest>, JsonRejection>,
) -> RpcResult<Settings> {
    verify_nonce(&state, &caller, &headers)?;
    caller.require(Capability::ManageOptions)?;
    let Json(req) = body.map_err(ApiError::bad_body)?;

    let api_key = sanitize_text_field(&req.api_key);
    let model = sanitize_text_field(&req.model);
    // Absent means the default budget; anything unreadable fails the range check.
    let max_tokens = match &req.max_tokens {
        None | Some(Value::Null) => i64::from(DEFAULT_MAX_TOKENS),
        Some(v) => int_value(v).unwrap_or(0),
    };

    let settings = Settings::validate(&api_key, &model, max_tokens)?;

    {
        let mut conn = state.db.lock().await;
        store::save_settings(&mut conn, &settings)
            .map_err(|e| ApiError::storage(e, "Failed to save settings"))?;
    }

    tracing::info!(user = %caller.user, ?settings, "settings updated");
    Ok(Envelope::with_message(
        "Settings saved successfully!",
        settings,
    ))
}

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
) -> RpcResult<Settings> {
    verify_nonce(&state, &caller, &headers)?;
    caller.require(Capability::ManageOptions)?;

    let conn = state.db.lock().await;
    let settings =
        store::load_settings(&conn).map_err(|e| ApiError::storage(e, "Failed to load settings"))?;
    Ok(Envelope::data(settings))
}
