use std::time::Duration;

use crate::error::CompletionError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client for completion calls. The timeout covers the whole
/// request, body included.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CompletionError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("codesnip/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(CompletionError::Client)
}
