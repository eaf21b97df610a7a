//! Shared wire handling for OpenAI-compatible `/chat/completions` endpoints.
//!
//! ```text
//! POST {base}/chat/completions
//! {"model":"...","messages":[{"role":"system",...},{"role":"user",...}],"temperature":0.1,"max_tokens":3000}
//! ```
//!
//! The completion text is taken from the first entry of `choices`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProviderError;
use crate::types::CompletionRequest;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatCompletionBody<'a> {
    pub fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

/// Non-streaming response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: CompletionMessage,
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionMessage {
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / response helpers
// ---------------------------------------------------------------------------

/// POST `body` to `{base_url}/chat/completions` with bearer auth and return
/// the first completion's text.
pub(crate) async fn post_completions(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    extra_headers: &[(&'static str, &'static str)],
    body: &ChatCompletionBody<'_>,
) -> Result<String, ProviderError> {
    let url = format!("{base_url}/chat/completions");

    let mut builder = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json");
    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }

    let resp = builder.json(body).send().await.map_err(map_transport_error)?;
    read_completion(resp).await
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map HTTP error statuses to typed errors, then decode the envelope.
pub(crate) async fn read_completion(resp: reqwest::Response) -> Result<String, ProviderError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::InvalidKey);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimit);
    }
    if status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status == reqwest::StatusCode::GATEWAY_TIMEOUT
    {
        return Err(ProviderError::Timeout);
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Other(format!("API error {status}: {text}")));
    }

    let data: ChatCompletionResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::Other(format!("JSON parse error: {e}")))?;

    debug!(model = data.model.as_deref().unwrap_or("?"), "Completion received");

    data.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}
