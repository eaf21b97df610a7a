//! OpenAI provider.
//!
//! Uses raw `reqwest` against the OpenAI `/chat/completions` endpoint with an
//! API key sent as a bearer token.

use async_trait::async_trait;
use forge_core::ProviderKind;

use super::chat_completions::{self, ChatCompletionBody};
use super::{GenerationTransport, ProviderError};
use crate::types::CompletionRequest;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API provider.
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a provider. `base_url` overrides the public endpoint (proxies,
    /// Azure-compatible gateways).
    pub fn new(api_key: String, base_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationTransport for OpenAIProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionBody::from_request(request);
        chat_completions::post_completions(&self.client, &self.base_url, &self.api_key, &[], &body)
            .await
    }
}
