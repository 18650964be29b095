//! Runtime configuration, read from `PUMPDRIVE__*` environment variables.
//!
//! A `.env` file is honoured when present. Nested keys are joined with `__`,
//! so `PUMPDRIVE__CACHE__BACKEND=redis` sets `cache.backend`. Every field
//! has a default and an empty environment gives a working offline engine.
//!
//! ```no_run
//! use pumpdrive_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod ai;
mod cache;
mod enrichment;
mod error;
mod logging;
mod storage;

pub use ai::AiConfig;
pub use cache::{CacheBackend, CacheConfig};
pub use enrichment::EnrichmentConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use storage::{CatalogConfig, StorageBackend, StorageConfig};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and the process environment.
    ///
    /// Fails only when a present variable cannot be parsed into its field.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }

        let env = config::Environment::default()
            .prefix("PUMPDRIVE")
            .separator("__");
        Ok(config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?)
    }

    /// Checks cross-field prerequisites, such as a Redis URL when the Redis
    /// cache is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.enrichment.validate()?;
        self.cache.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// True when a completion provider can be called.
    pub fn is_online(&self) -> bool {
        self.enrichment.enabled && self.ai.has_anthropic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // The environment is process-wide.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PUMPDRIVE__AI__ANTHROPIC_API_KEY",
        "PUMPDRIVE__ENRICHMENT__MIN_INTERVAL_MS",
        "PUMPDRIVE__ENRICHMENT__ENABLED",
        "PUMPDRIVE__CACHE__BACKEND",
        "PUMPDRIVE__CACHE__REDIS_URL",
        "PUMPDRIVE__STORAGE__BACKEND",
        "PUMPDRIVE__STORAGE__PATH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn empty_environment_is_offline_and_in_memory() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.is_online());
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn nested_variables_reach_their_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PUMPDRIVE__AI__ANTHROPIC_API_KEY", "sk-ant-test");
        env::set_var("PUMPDRIVE__ENRICHMENT__MIN_INTERVAL_MS", "500");
        env::set_var("PUMPDRIVE__CACHE__BACKEND", "redis");
        env::set_var("PUMPDRIVE__CACHE__REDIS_URL", "redis://localhost:6379");
        env::set_var("PUMPDRIVE__STORAGE__BACKEND", "file");
        env::set_var("PUMPDRIVE__STORAGE__PATH", "/tmp/pumpdrive");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_online());
        assert_eq!(config.enrichment.min_interval_ms, 500);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn disabled_enrichment_stays_offline_with_a_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PUMPDRIVE__AI__ANTHROPIC_API_KEY", "sk-ant-test");
        env::set_var("PUMPDRIVE__ENRICHMENT__ENABLED", "false");
        let result = AppConfig::load();
        clear_env();

        assert!(!result.unwrap().is_online());
    }

    #[test]
    fn redis_backend_requires_a_url() {
        let config = AppConfig {
            cache: CacheConfig {
                backend: CacheBackend::Redis,
                redis_url: None,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
