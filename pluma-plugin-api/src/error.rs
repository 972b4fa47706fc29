//! Error types for plugin authors

use thiserror::Error;

/// Errors that plugin hooks can return
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration between two versions failed
    #[error("Update from {from} to {to} failed: {reason}")]
    Update {
        from: String,
        to: String,
        reason: String,
    },

    /// The plugin does not understand a message
    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an update error
    pub fn update(from: impl Into<String>, to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Update {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
