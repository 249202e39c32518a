//! Error types for the voter.
//!
//! Per-cycle conditions (receive timeout, malformed payload, full outbound
//! channel) are handled inside the voting loop and never surface here as
//! task failures. These errors cover configuration, wire decoding and task
//! lifecycle.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while configuring or hosting the voter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoterError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Payload length does not match the expected record size.
    #[error("Malformed payload: expected {expected} bytes, received {len}")]
    MalformedPayload {
        /// Received payload length.
        len: usize,
        /// Expected record length.
        expected: usize,
    },

    /// Configuration file could not be read.
    #[error("Failed to read configuration file {}: {reason}", path.display())]
    ConfigIo {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// The voter thread could not be started.
    #[error("Failed to spawn voter task: {0}")]
    TaskSpawn(String),

    /// The voter thread panicked before returning its statistics.
    #[error("Voter task panicked")]
    TaskPanicked,
}

impl VoterError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create a malformed payload error.
    #[must_use]
    pub fn malformed_payload(len: usize, expected: usize) -> Self {
        Self::MalformedPayload { len, expected }
    }

    /// Create a configuration I/O error.
    #[must_use]
    pub fn config_io(path: &Path, reason: impl Into<String>) -> Self {
        Self::ConfigIo {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a configuration parse error.
    #[must_use]
    pub fn config_parse(reason: impl Into<String>) -> Self {
        Self::ConfigParse(reason.into())
    }

    /// Create a task spawn error.
    #[must_use]
    pub fn task_spawn(reason: impl Into<String>) -> Self {
        Self::TaskSpawn(reason.into())
    }
}

/// A specialized `Result` type for voter operations.
pub type VoterResult<T> = std::result::Result<T, VoterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoterError::malformed_payload(4, 6);
        assert_eq!(
            err.to_string(),
            "Malformed payload: expected 6 bytes, received 4"
        );

        let err = VoterError::config_io(Path::new("voter.yaml"), "not found");
        assert!(err.to_string().contains("voter.yaml"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_error_constructors() {
        let err = VoterError::invalid_configuration("mask is zero");
        assert!(matches!(err, VoterError::InvalidConfiguration(_)));

        let err = VoterError::task_spawn("no threads");
        assert!(matches!(err, VoterError::TaskSpawn(_)));
    }
}
