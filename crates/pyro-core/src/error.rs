//! Error types for Pyro

use thiserror::Error;

/// The main error type for Pyro operations
///
/// The simulation itself never fails; these cover the fallible seams around
/// it (loading settings, resolving names, talking to the render device).
#[derive(Debug, Error)]
pub enum PyroError {
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid config value for {key}: expected {expected}")]
    InvalidConfigValue { key: String, expected: String },

    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pyro operations
pub type Result<T> = std::result::Result<T, PyroError>;

impl From<toml::de::Error> for PyroError {
    fn from(err: toml::de::Error) -> Self {
        PyroError::ConfigParse(err.to_string())
    }
}
