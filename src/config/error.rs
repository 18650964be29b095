use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that parses but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("redis url must start with redis:// or rediss://")]
    InvalidRedisUrl,

    #[error("anthropic api key must start with sk-ant-")]
    InvalidAnthropicKey,

    #[error("max_tokens must be between 1 and {max}")]
    InvalidMaxTokens { max: u32 },

    #[error("cache ttl must be positive")]
    InvalidCacheTtl,

    #[error("queue wait must be positive")]
    InvalidQueueWait,

    #[error("retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    #[error("log filter: {0}")]
    InvalidLogFilter(String),
}
