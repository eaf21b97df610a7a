//! GitHub Models provider.
//!
//! OpenAI-compatible inference endpoint authenticated with a GitHub token
//! (read from `GITHUB_TOKEN`, never embedded in source).

use async_trait::async_trait;
use forge_core::ProviderKind;

use super::chat_completions::{self, ChatCompletionBody};
use super::{GenerationTransport, ProviderError};
use crate::types::CompletionRequest;

const DEFAULT_BASE_URL: &str = "https://models.github.ai/inference";

const GITHUB_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/vnd.github+json"),
    ("X-GitHub-Api-Version", "2022-11-28"),
];

pub struct GitHubModelsProvider {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl GitHubModelsProvider {
    pub fn new(token: String, base_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationTransport for GitHubModelsProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn name(&self) -> &str {
        "GitHub Models"
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionBody::from_request(request);
        chat_completions::post_completions(
            &self.client,
            &self.base_url,
            &self.token,
            GITHUB_HEADERS,
            &body,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_metadata() {
        let provider = GitHubModelsProvider::new("ghp_test".into(), None, reqwest::Client::new());
        assert_eq!(provider.provider_kind(), ProviderKind::GitHub);
        assert_eq!(provider.base_url(), "https://models.github.ai/inference");
    }
}
