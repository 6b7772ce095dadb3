use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("OpenAI API key not configured. Please configure it in Settings.")]
    MissingApiKey,

    /// The request never produced an HTTP response (DNS, TLS, timeout).
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from AI API.")]
    EmptyResponse,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
