//! Generation transports.
//!
//! Each provider module exposes a struct that implements
//! [`GenerationTransport`]. Both current backends speak the OpenAI-compatible
//! `/chat/completions` format and share the wire handling in
//! [`chat_completions`].

pub(crate) mod chat_completions;
pub mod github;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use forge_core::{ConfigError, ForgeConfig, ProviderKind};

use crate::types::CompletionRequest;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a transport may return for a single attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited")]
    RateLimit,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("Timeout")]
    Timeout,

    #[error("Empty completion in provider response")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One request/response exchange with a remote text-generation endpoint.
///
/// Implementations perform no retries; that policy lives in
/// [`crate::GenerationClient`].
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    fn provider_kind(&self) -> ProviderKind;

    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Send the request and return the first completion's text.
    async fn send(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Build the transport selected by `config`.
///
/// Fails before any network I/O when the credential is missing or the HTTP
/// client cannot be constructed.
pub fn transport_for(config: &ForgeConfig) -> Result<Arc<dyn GenerationTransport>, ConfigError> {
    let key = config.require_api_key()?.to_string();
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

    let transport: Arc<dyn GenerationTransport> = match config.provider {
        ProviderKind::OpenAI => Arc::new(openai::OpenAIProvider::new(
            key,
            config.base_url.clone(),
            http,
        )),
        ProviderKind::GitHub => Arc::new(github::GitHubModelsProvider::new(
            key,
            config.base_url.clone(),
            http,
        )),
    };
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fails_before_io() {
        let config = ForgeConfig::default();
        let err = transport_for(&config).err().expect("should fail");
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn selects_transport_by_provider() {
        let config = ForgeConfig {
            openai_api_key: Some("sk-test".into()),
            ..ForgeConfig::default()
        };
        let transport = transport_for(&config).unwrap();
        assert_eq!(transport.provider_kind(), ProviderKind::OpenAI);

        let config = ForgeConfig {
            provider: ProviderKind::GitHub,
            github_token: Some("ghp_test".into()),
            ..ForgeConfig::default()
        };
        let transport = transport_for(&config).unwrap();
        assert_eq!(transport.provider_kind(), ProviderKind::GitHub);
        assert_eq!(transport.name(), "GitHub Models");
    }
}
