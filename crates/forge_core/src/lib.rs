pub mod config;
pub mod logging;

pub use config::{ConfigError, ForgeConfig, MAX_RETRY_DELAY_SECS, ProviderKind};
