//! Route handlers.
//!
//! Every `/rpc/*` handler runs the same stages: anti-forgery token, field
//! validation, sanitization, store or model call, envelope.

pub mod admin;
pub mod assist;
pub mod embed;
pub mod health;
pub mod settings;
pub mod snippets;

use axum::Json;
use axum::http::HeaderMap;
use codesnip_auth::{Caller, NONCE_ACTION};
use codesnip_core::models::snippet::SnippetId;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the anti-forgery token issued with the admin page.
pub const NONCE_HEADER: &str = "x-codesnip-nonce";

pub type RpcResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Success body: `{"ok":true,"message"?,"data"?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl Envelope<()> {
    pub fn message(message: &'static str) -> Json<Self> {
        Json(Self {
            ok: true,
            message: Some(message),
            data: None,
        })
    }
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: &'static str, data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            message: Some(message),
            data: Some(data),
        })
    }
}

pub(crate) fn verify_nonce(
    state: &AppState,
    caller: &Caller,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    let token = headers
        .get(NONCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::invalid_nonce)?;
    state.nonces.verify(token, NONCE_ACTION, &caller.user)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdError {
    Missing,
    Invalid,
}

/// Snippet ids arrive as JSON numbers or numeric strings.
pub(crate) fn parse_id(value: Option<&Value>) -> Result<SnippetId, IdError> {
    match value {
        None | Some(Value::Null) => Err(IdError::Missing),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|raw| SnippetId::new(raw).ok())
            .ok_or(IdError::Invalid),
        Some(Value::String(s)) => s.parse().map_err(|_| IdError::Invalid),
        Some(_) => Err(IdError::Invalid),
    }
}

/// `0`/`1` as number, string or boolean.
pub(crate) fn parse_status(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        other => match int_value(other)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
    }
}

pub(crate) fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
