//! Error types for the cortex framework

use thiserror::Error;

/// Result type alias using cortex's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Borrowed form of an arbitrary failure handed to the `*_failed` hooks.
///
/// The orchestration loop owns the concrete error; observers only inspect it.
pub type DynError = dyn std::error::Error + Send + Sync + 'static;

/// Main error type for the cortex framework
#[derive(Debug, Error)]
pub enum Error {
    // ============ Config Errors ============
    /// Configuration could not be found or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration was parsed but holds invalid values
    #[error("Invalid configuration: {field} - {message}")]
    ConfigValidation {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// YAML document could not be decoded
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    // ============ Identity Errors ============
    /// An identifier string could not be parsed
    #[error("Invalid id {value:?}: {reason}")]
    InvalidId {
        /// The rejected input
        value: String,
        /// Why it was rejected
        reason: String,
    },

    // ============ Hook Errors ============
    /// A lifecycle hook reported a failure
    #[error("Hook error in {extension}: {message}")]
    Hook {
        /// Name of the extension whose hook failed
        extension: String,
        /// Error message
        message: String,
    },

    // ============ Recorder Errors ============
    /// An audit or metrics sink rejected a record
    #[error("Recorder error: {0}")]
    Recorder(String),

    // ============ System Errors ============
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid id error
    pub fn invalid_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidId {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new hook error
    pub fn hook(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// Create a new recorder error
    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder(msg.into())
    }

    /// Check if this error came from configuration handling
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::ConfigValidation { .. } | Self::Yaml(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_display() {
        let err = Error::hook("audit-hook", "sink unreachable");
        assert_eq!(err.to_string(), "Hook error in audit-hook: sink unreachable");
    }

    #[test]
    fn test_anyhow_is_transparent() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_config());
    }

    #[test]
    fn test_config_classification() {
        assert!(Error::config("missing").is_config());
        assert!(Error::config_validation("run_concurrency", "must be > 0").is_config());
        assert!(!Error::recorder("full").is_config());
    }
}
