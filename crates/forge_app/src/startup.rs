use anyhow::{Context, Result};
use tracing::info;

use forge_ai::GenerationClient;
use forge_core::ForgeConfig;
use forge_core::logging::{self, WorkerGuard};
use forge_qa::SYSTEM_INSTRUCTION;

/// Everything that must exist before the first document is read.
pub struct Session {
    pub client: GenerationClient,
    /// Flushes the log file on drop.
    pub log_guard: WorkerGuard,
}

/// Validate the generation setup, then install logging.
///
/// A configuration error returns before the diagnostics directory or log
/// file is created.
pub fn start(config: &ForgeConfig) -> Result<Session> {
    let client = GenerationClient::from_config(config, SYSTEM_INSTRUCTION)
        .context("Generation client not configured")?;
    let log_guard = logging::init_logging(config)?;

    info!(
        provider = client.provider_name(),
        model = %config.model,
        max_attempts = config.max_attempts,
        "TestForge starting"
    );
    Ok(Session { client, log_guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::ConfigError;

    #[test]
    fn missing_credential_touches_no_files() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ForgeConfig {
            diagnostics_dir: tmp.path().join(".logs"),
            ..ForgeConfig::default()
        };

        let err = start(&config).err().expect("no credential configured");
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingCredential { env_var: "OPENAI_API_KEY", .. })
        ));
        assert!(!config.diagnostics_dir.exists());
    }
}
