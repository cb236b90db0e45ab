use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(vakanz::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(vakanz::config))]
    Config(String),

    #[error("Update failed: {0}")]
    #[diagnostic(code(vakanz::update_failed))]
    UpdateFailed(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(vakanz::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(vakanz::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(vakanz::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(vakanz::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalResult<T> = Result<T, Error>;

/// Helper to create environment errors
#[allow(dead_code)]
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create update failures (non-200 status, transport error, empty body)
pub fn update_failed(message: &str) -> Error {
    Error::UpdateFailed(message.to_string())
}
