use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Environment keys
// ---------------------------------------------------------------------------

const ENV_PROVIDER: &str = "AI_PROVIDER";
const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
const ENV_API_URL: &str = "AI_API_URL";
const ENV_MODEL: &str = "AI_MODEL";
const ENV_TEMPERATURE: &str = "AI_TEMPERATURE";
const ENV_MAX_TOKENS: &str = "AI_MAX_TOKENS";
const ENV_TIMEOUT: &str = "AI_TIMEOUT_SECS";
const ENV_MAX_ATTEMPTS: &str = "AI_MAX_ATTEMPTS";
const ENV_BACKOFF_BASE: &str = "AI_BACKOFF_BASE";
const ENV_DOCUMENTS_DIR: &str = "DOCUMENTS_DIR";
const ENV_OUTPUT: &str = "EXCEL_OUTPUT";
const ENV_DIAGNOSTICS_DIR: &str = "DIAGNOSTICS_DIR";
const ENV_MANUAL_MIN: &str = "MANUAL_MIN_PER_TEST";
const ENV_AI_MIN: &str = "AI_MIN_PER_TEST";
const ENV_LOG: &str = "TESTFORGE_LOG";

/// Upper bound for any single backoff sleep, in seconds.
pub const MAX_RETRY_DELAY_SECS: f64 = 3600.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Problems detected while assembling the run configuration.
///
/// All of these are fatal and raised before any document is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AI provider '{0}' is not implemented (supported: openai, github)")]
    UnsupportedProvider(String),

    #[error("missing credential for provider {provider}: set {env_var}")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// The generation backend active for a run. Exactly one is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// OpenAI chat completions API.
    #[default]
    OpenAI,
    /// GitHub Models inference endpoint, authenticated with a GitHub token.
    GitHub,
}

impl ProviderKind {
    /// Environment variable holding this provider's credential.
    pub fn credential_env(self) -> &'static str {
        match self {
            Self::OpenAI => ENV_OPENAI_KEY,
            Self::GitHub => ENV_GITHUB_TOKEN,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::GitHub => "openai/gpt-4.1",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "github" => Ok(Self::GitHub),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::GitHub => write!(f, "github"),
        }
    }
}

// ---------------------------------------------------------------------------
// ForgeConfig
// ---------------------------------------------------------------------------

/// Run configuration, built once at startup and passed explicitly to every
/// component.
///
/// Credentials are only ever read from their named environment variables and
/// are never printed by the `Debug` impl.
#[derive(Clone)]
pub struct ForgeConfig {
    pub provider: ProviderKind,
    pub openai_api_key: Option<String>,
    pub github_token: Option<String>,
    /// Overrides the provider's default endpoint (proxies, gateways).
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff_base^n` seconds.
    pub backoff_base: f64,

    pub documents_dir: PathBuf,
    pub output_path: PathBuf,
    /// Raw responses that fail to parse and the rolling log file live here.
    pub diagnostics_dir: PathBuf,

    pub manual_min_per_test: u32,
    pub ai_min_per_test: u32,

    pub log_filter: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        let provider = ProviderKind::default();
        Self {
            provider,
            openai_api_key: None,
            github_token: None,
            base_url: None,
            model: provider.default_model().into(),
            temperature: 0.1,
            max_tokens: 3000,
            request_timeout: Duration::from_secs(120),
            max_attempts: 3,
            backoff_base: 2.0,
            documents_dir: PathBuf::from("Documentações"),
            output_path: PathBuf::from("cenarios_de_testes.xlsx"),
            diagnostics_dir: PathBuf::from(".logs"),
            manual_min_per_test: 15,
            ai_min_per_test: 2,
            log_filter: "info".into(),
        }
    }
}

impl std::fmt::Debug for ForgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeConfig")
            .field("provider", &self.provider)
            .field("has_credential", &self.api_key().is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base", &self.backoff_base)
            .field("documents_dir", &self.documents_dir)
            .field("output_path", &self.output_path)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .finish_non_exhaustive()
    }
}

impl ForgeConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from a fixed key/value map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let provider = match get(ENV_PROVIDER) {
            Some(raw) => raw.parse::<ProviderKind>()?,
            None => defaults.provider,
        };

        let max_attempts = parse_or(get(ENV_MAX_ATTEMPTS), ENV_MAX_ATTEMPTS, defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_MAX_ATTEMPTS,
                value: max_attempts.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        let backoff_base = parse_or(get(ENV_BACKOFF_BASE), ENV_BACKOFF_BASE, defaults.backoff_base)?;
        if !backoff_base.is_finite() || backoff_base < 0.0 {
            return Err(ConfigError::Invalid {
                key: ENV_BACKOFF_BASE,
                value: backoff_base.to_string(),
                reason: "must be a finite, non-negative number".into(),
            });
        }
        // Longest wait happens before the last attempt.
        let exponent = i32::try_from(max_attempts - 1).unwrap_or(i32::MAX);
        let longest_delay = backoff_base.powi(exponent);
        if longest_delay > MAX_RETRY_DELAY_SECS {
            return Err(ConfigError::Invalid {
                key: ENV_BACKOFF_BASE,
                value: backoff_base.to_string(),
                reason: format!(
                    "retry delay of {longest_delay}s with {max_attempts} attempts exceeds {MAX_RETRY_DELAY_SECS}s"
                ),
            });
        }

        let timeout_secs: u64 = parse_or(
            get(ENV_TIMEOUT),
            ENV_TIMEOUT,
            defaults.request_timeout.as_secs(),
        )?;

        Ok(Self {
            provider,
            openai_api_key: get(ENV_OPENAI_KEY),
            github_token: get(ENV_GITHUB_TOKEN),
            base_url: get(ENV_API_URL).map(|u| u.trim_end_matches('/').to_string()),
            model: get(ENV_MODEL).unwrap_or_else(|| provider.default_model().into()),
            temperature: parse_or(get(ENV_TEMPERATURE), ENV_TEMPERATURE, defaults.temperature)?,
            max_tokens: parse_or(get(ENV_MAX_TOKENS), ENV_MAX_TOKENS, defaults.max_tokens)?,
            request_timeout: Duration::from_secs(timeout_secs),
            max_attempts,
            backoff_base,
            documents_dir: get(ENV_DOCUMENTS_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_dir),
            output_path: get(ENV_OUTPUT)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            diagnostics_dir: get(ENV_DIAGNOSTICS_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.diagnostics_dir),
            manual_min_per_test: parse_or(get(ENV_MANUAL_MIN), ENV_MANUAL_MIN, defaults.manual_min_per_test)?,
            ai_min_per_test: parse_or(get(ENV_AI_MIN), ENV_AI_MIN, defaults.ai_min_per_test)?,
            log_filter: get(ENV_LOG).unwrap_or(defaults.log_filter),
        })
    }

    /// Credential for the selected provider, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            ProviderKind::OpenAI => self.openai_api_key.as_deref(),
            ProviderKind::GitHub => self.github_token.as_deref(),
        }
    }

    /// Credential for the selected provider, or a `MissingCredential` error.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key().ok_or(ConfigError::MissingCredential {
            provider: self.provider,
            env_var: self.provider.credential_env(),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
