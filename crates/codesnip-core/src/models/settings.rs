use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SettingsError;

/// Chat models the settings form may select.
pub const ALLOWED_MODELS: &[&str] = &[
    "gpt-4.1",
    "gpt-4.1-mini",
    "gpt-4.1-nano",
    "gpt-4o",
    "gpt-4o-mini",
    "o1",
    "o1-mini",
    "o3",
    "o3-mini",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
];

pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const MAX_TOKENS_LIMIT: u32 = 4000;

const API_KEY_MIN_LEN: usize = 32;
const API_KEY_MAX_LEN: usize = 200;

/// Completion settings, loaded once per request and handed to the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Settings {
    /// Validate submitted values, reporting the first failing check.
    ///
    /// Order: key present, key format, model present, model allowed, token
    /// budget in range.
    pub fn validate(api_key: &str, model: &str, max_tokens: i64) -> Result<Self, SettingsError> {
        if api_key.is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if !is_valid_api_key(api_key) {
            return Err(SettingsError::InvalidApiKey);
        }
        if model.is_empty() {
            return Err(SettingsError::MissingModel);
        }
        if !is_allowed_model(model) {
            return Err(SettingsError::UnknownModel(model.to_string()));
        }
        let max_tokens = u32::try_from(max_tokens)
            .ok()
            .filter(|n| (1..=MAX_TOKENS_LIMIT).contains(n))
            .ok_or(SettingsError::MaxTokensOutOfRange(max_tokens))?;

        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// API keys stay out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &redact_api_key(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

pub fn is_allowed_model(model: &str) -> bool {
    ALLOWED_MODELS.contains(&model)
}

/// `^[A-Za-z0-9_-]{32,200}$`
pub fn is_valid_api_key(key: &str) -> bool {
    (API_KEY_MIN_LEN..=API_KEY_MAX_LEN).contains(&key.len())
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

pub fn redact_api_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    let prefix = &key[..4];
    let suffix = &key[key.len() - 4..];
    format!("{prefix}...{suffix}")
}
