//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address")]
    InvalidBindAddress,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Backend URL must use HTTPS in production")]
    BackendMustBeHttps,

    #[error("Invalid tracking base URL: {0}")]
    InvalidTrackingUrl(String),

    #[error("Link signing secret must be at least {0} characters")]
    SigningSecretTooShort(usize),

    #[error("Tracking link TTL must be between 60 seconds and 30 days")]
    InvalidLinkTtl,

    #[error("Channel capacity must be between 1 and 10000")]
    InvalidChannelCapacity,
}
