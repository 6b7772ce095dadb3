use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid snippet id: {0}")]
    InvalidSnippetId(String),

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A snippet body opened one of the disallow-listed tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The <{tag}> tag is not allowed in snippets.")]
pub struct PolicyViolation {
    pub tag: &'static str,
}

/// Rejections raised while validating submitted model settings.
///
/// Variants are listed in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("Invalid API key format")]
    InvalidApiKey,

    #[error("Model is required")]
    MissingModel,

    #[error("Invalid model selection")]
    UnknownModel(String),

    #[error("Max tokens must be between 1 and 4000")]
    MaxTokensOutOfRange(i64),
}
