//! Generation Client: one prompt in, one completion text out.
//!
//! Owns the retry/backoff loop around a [`GenerationTransport`]. No state is
//! kept between calls.

use std::sync::Arc;

use forge_core::{ConfigError, ForgeConfig};
use tracing::{info, warn};

use crate::providers::{self, GenerationTransport, ProviderError};
use crate::retry::RetryPolicy;
use crate::types::CompletionRequest;

/// Raised once every attempt has failed. Carries the last attempt's cause.
#[derive(Debug, thiserror::Error)]
#[error("generation failed after {attempts} attempt(s): {source}")]
pub struct GenerationError {
    pub attempts: u32,
    #[source]
    pub source: ProviderError,
}

pub struct GenerationClient {
    transport: Arc<dyn GenerationTransport>,
    retry: RetryPolicy,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl GenerationClient {
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        retry: RetryPolicy,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let defaults = ForgeConfig::default();
        Self {
            transport,
            retry,
            model: model.into(),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build the client for the provider selected in `config`.
    ///
    /// A missing credential is reported here, before any request is sent.
    /// Performs no I/O.
    pub fn from_config(
        config: &ForgeConfig,
        system_prompt: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let transport = providers::transport_for(config)?;
        Ok(Self::new(
            transport,
            RetryPolicy::from_config(config),
            config.model.clone(),
            system_prompt,
        )
        .with_sampling(config.temperature, config.max_tokens))
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.transport.name()
    }

    /// Send `prompt` and return the raw completion text.
    ///
    /// Every transport error is retried until `max_attempts` is reached,
    /// sleeping `backoff_base^attempt` seconds in between. The last error is
    /// returned inside [`GenerationError`]; nothing is logged above `warn`.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = CompletionRequest::new(
            self.model.clone(),
            self.system_prompt.clone(),
            prompt,
            self.temperature,
            self.max_tokens,
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(provider = self.transport.name(), attempt, "Calling generation API");

            let err = match self.transport.send(&request).await {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            match self.retry.delay_after(attempt) {
                Some(delay) => {
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %err,
                        "Generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    // The caller owns the failure and reports it.
                    warn!(attempts = attempt, error = %err, "Generation attempts exhausted");
                    return Err(GenerationError {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use forge_core::ProviderKind;

    /// Replays scripted results in order; the last one repeats.
    struct ScriptedTransport {
        script: Vec<Result<String, ProviderError>>,
        calls: AtomicU32,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationTransport for ScriptedTransport {
        fn provider_kind(&self) -> ProviderKind {
            ProviderKind::OpenAI
        }

        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            self.seen.lock().unwrap().push(request.clone());
            let idx = n.min(self.script.len() - 1);
            self.script[idx].clone()
        }
    }

    fn client(transport: Arc<ScriptedTransport>, max_attempts: u32) -> GenerationClient {
        GenerationClient::new(
            transport,
            RetryPolicy::new(max_attempts, 2.0),
            "gpt-4",
            "system instruction",
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_returns_immediately() {
        let transport = ScriptedTransport::new(vec![Ok("{}".into())]);
        let c = client(transport.clone(), 3);

        assert_eq!(c.provider_name(), "scripted");
        let started = tokio::time::Instant::now();
        assert_eq!(c.generate("prompt").await.unwrap(), "{}");
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let transport = ScriptedTransport::new(vec![
            Err(ProviderError::RateLimit),
            Ok("recovered".into()),
        ]);
        let c = client(transport.clone(), 3);

        let started = tokio::time::Instant::now();
        assert_eq!(c.generate("prompt").await.unwrap(), "recovered");
        assert_eq!(transport.calls(), 2);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_cause() {
        let transport = ScriptedTransport::new(vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::RateLimit),
            Err(ProviderError::Network("connection reset".into())),
        ]);
        let c = client(transport.clone(), 3);

        let started = tokio::time::Instant::now();
        let err = c.generate("prompt").await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(err.attempts, 3);
        assert!(matches!(err.source, ProviderError::Network(ref m) if m == "connection reset"));
        // 2^1 + 2^2 seconds between attempts, nothing after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(14), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_does_not_sleep() {
        let transport = ScriptedTransport::new(vec![Err(ProviderError::InvalidKey)]);
        let c = client(transport.clone(), 1);

        let started = tokio::time::Instant::now();
        let err = c.generate("prompt").await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(transport.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn request_carries_system_and_prompt() {
        let transport = ScriptedTransport::new(vec![Ok("ok".into())]);
        let c = client(transport.clone(), 1).with_sampling(0.1, 1234);

        c.generate("the requirements").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        let req = &seen[0];
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.max_tokens, 1234);
        assert_eq!(req.messages[0].content, "system instruction");
        assert_eq!(req.prompt(), Some("the requirements"));
    }

    #[test]
    fn from_config_without_credential_fails() {
        let err = GenerationClient::from_config(&ForgeConfig::default(), "sys")
            .err()
            .expect("missing key must fail");
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn error_message_names_attempts() {
        let err = GenerationError {
            attempts: 3,
            source: ProviderError::Timeout,
        };
        assert_eq!(err.to_string(), "generation failed after 3 attempt(s): Timeout");
    }
}
