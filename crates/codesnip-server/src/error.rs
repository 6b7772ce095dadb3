use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use codesnip_auth::AuthError;
use codesnip_core::error::{PolicyViolation, SettingsError};
use codesnip_openai::CompletionError;
use codesnip_storage::StorageError;
use serde::Serialize;

/// Error categories surfaced by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Validation,
    Policy,
    NotFound,
    Store,
    Upstream,
    Config,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Policy => "policy",
            Self::NotFound => "not_found",
            Self::Store => "store",
            Self::Upstream => "upstream",
            Self::Config => "config",
        }
    }
}

/// Unified API error type for all route handlers.
///
/// Rendered as `{"ok":false,"error":...,"status":...}`. With a `field` set the
/// error is keyed (`{"error":{"title":"..."}}`), otherwise it is a plain
/// string.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_nonce() -> Self {
        Self::new(ErrorKind::Auth, StatusCode::FORBIDDEN, "Invalid nonce")
    }

    pub fn validation(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, status, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, StatusCode::NOT_FOUND, message)
    }

    /// Store failures other than a missing row are logged and reported with
    /// the caller-supplied message.
    pub fn storage(err: StorageError, failure: &'static str) -> Self {
        if err.is_not_found() {
            return Self::not_found("Snippet not found");
        }
        tracing::error!(error = %err, "store operation failed");
        Self::new(
            ErrorKind::Store,
            StatusCode::INTERNAL_SERVER_ERROR,
            failure,
        )
    }

    pub fn bad_body(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::validation(StatusCode::BAD_REQUEST, "Invalid request body")
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorPayload {
    Flat(String),
    Keyed(BTreeMap<&'static str, String>),
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: ErrorPayload,
    status: u16,
}

/// The kind travels on the response extensions so the audit middleware can
/// log it next to the status.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(kind = self.kind.as_str(), status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            tracing::debug!(kind = self.kind.as_str(), status = self.status.as_u16(), message = %self.message, "request rejected");
        }

        let kind = self.kind;
        let error = match self.field {
            Some(field) => ErrorPayload::Keyed(BTreeMap::from([(field, self.message)])),
            None => ErrorPayload::Flat(self.message),
        };
        let body = ErrorBody {
            ok: false,
            error,
            status: self.status.as_u16(),
        };
        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}

/// Convert an error into an [`ApiError`] keyed under `field`, unless the
/// conversion already chose a field.
pub trait ResultExt<T> {
    fn keyed(self, field: &'static str) -> Result<T, ApiError>;
}

impl<T, E: Into<ApiError>> ResultExt<T> for Result<T, E> {
    fn keyed(self, field: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            let err = e.into();
            if err.field.is_some() {
                err
            } else {
                err.with_field(field)
            }
        })
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidNonce => ApiError::invalid_nonce(),
            AuthError::Forbidden { .. } => {
                ApiError::new(ErrorKind::Auth, StatusCode::FORBIDDEN, "Insufficient permissions")
            }
            AuthError::MissingCaller => {
                ApiError::new(ErrorKind::Auth, StatusCode::UNAUTHORIZED, "Authentication required")
            }
            AuthError::EmptySecret => ApiError::new(
                ErrorKind::Config,
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ),
        }
    }
}

impl From<PolicyViolation> for ApiError {
    fn from(e: PolicyViolation) -> Self {
        ApiError::new(ErrorKind::Policy, StatusCode::FORBIDDEN, e.to_string()).with_field("snippet")
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        ApiError::validation(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<CompletionError> for ApiError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::MissingApiKey => {
                ApiError::new(ErrorKind::Config, StatusCode::BAD_REQUEST, e.to_string())
            }
            CompletionError::Upstream { status, message } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::new(ErrorKind::Upstream, status, message)
            }
            CompletionError::EmptyResponse => ApiError::new(
                ErrorKind::Upstream,
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ),
            CompletionError::Transport(_) => {
                ApiError::new(ErrorKind::Upstream, StatusCode::BAD_GATEWAY, e.to_string())
            }
            CompletionError::Client(_) => {
                tracing::error!(error = %e, "completion client misconfigured");
                ApiError::new(
                    ErrorKind::Config,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI service unavailable",
                )
            }
        }
    }
}
