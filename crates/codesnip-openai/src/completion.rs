use codesnip_core::models::settings::Settings;
use codesnip_core::policy::clean_completion;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CompletionError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Send `prompt` as a single user message and return the raw reply text.
///
/// One attempt only. The client's timeout bounds the whole call.
pub async fn complete(
    client: &reqwest::Client,
    base_url: &str,
    settings: &Settings,
    prompt: &str,
) -> Result<String, CompletionError> {
    if !settings.has_api_key() {
        return Err(CompletionError::MissingApiKey);
    }

    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let request = ChatRequest {
        model: &settings.model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: settings.max_tokens,
    };

    info!(model = %settings.model, max_tokens = settings.max_tokens, "requesting completion");
    let response = client
        .post(&url)
        .bearer_auth(&settings.api_key)
        .json(&request)
        .send()
        .await
        .map_err(CompletionError::Transport)?;

    let status = response.status();
    let body = response.text().await.map_err(CompletionError::Transport)?;

    if !status.is_success() {
        let err = upstream_error(status, &body);
        warn!(status = status.as_u16(), error = %err, "completion request failed");
        return Err(err);
    }

    let parsed: ChatResponse = serde_json::from_str(&body).unwrap_or_default();
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(CompletionError::EmptyResponse)
}

/// [`complete`], then filter the reply down to markup the editor may show.
pub async fn suggest(
    client: &reqwest::Client,
    base_url: &str,
    settings: &Settings,
    prompt: &str,
) -> Result<String, CompletionError> {
    let reply = complete(client, base_url, settings, prompt).await?;
    Ok(clean_completion(&reply))
}

/// Provider message when the body carries one, otherwise a fixed message
/// for the well-known statuses.
pub fn upstream_error(status: StatusCode, body: &str) -> CompletionError {
    let provided = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message);

    let message = provided.unwrap_or_else(|| {
        let fallback = match status {
            StatusCode::UNAUTHORIZED => {
                "Invalid API key. Please check your OpenAI API key in Settings."
            }
            StatusCode::TOO_MANY_REQUESTS => "Rate limit exceeded. Please try again later.",
            StatusCode::INTERNAL_SERVER_ERROR => "OpenAI service error. Please try again later.",
            _ => "API request failed",
        };
        fallback.to_string()
    });

    CompletionError::Upstream {
        status: status.as_u16(),
        message,
    }
}
