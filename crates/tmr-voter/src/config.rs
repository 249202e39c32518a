//! Voter configuration.
//!
//! The configuration is fixed for the lifetime of a voter. It can be built in
//! code, through [`VoterConfigBuilder`], or loaded from YAML/JSON. Missing
//! fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{VoterError, VoterResult};
use crate::health::DEFAULT_DEVIATION_THRESHOLD;

/// Default number of valid cycles per health classification window.
pub const DEFAULT_WINDOW_LEN: u32 = 10;

/// Default bounded wait for an inbound reading (milliseconds).
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1000;

/// Default bounded wait for forwarding a result (milliseconds).
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 100;

/// Voter task configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoterConfig {
    /// Bit mask applied to every raw sample before voting.
    pub mask: u16,
    /// Bounded wait for the next reading (milliseconds).
    pub receive_timeout_ms: u64,
    /// Bounded wait when the outbound channel is full (milliseconds).
    pub send_timeout_ms: u64,
    /// Valid cycles per classification window.
    pub window_len: u32,
    /// Pairwise deviation threshold used by the classifier.
    pub deviation_threshold: u16,
}

impl Default for VoterConfig {
    fn default() -> Self {
        Self {
            mask: u16::MAX,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            window_len: DEFAULT_WINDOW_LEN,
            deviation_threshold: DEFAULT_DEVIATION_THRESHOLD,
        }
    }
}

impl VoterConfig {
    /// Default configuration with the given mask.
    #[must_use]
    pub fn with_mask(mask: u16) -> Self {
        Self {
            mask,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> VoterResult<()> {
        if self.receive_timeout_ms == 0 {
            return Err(VoterError::invalid_configuration(
                "receive_timeout_ms must be greater than 0",
            ));
        }
        if self.window_len == 0 {
            return Err(VoterError::invalid_configuration(
                "window_len must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Receive timeout as a `Duration`.
    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Send timeout as a `Duration`.
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Parse and validate a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the result is invalid.
    pub fn from_yaml_str(text: &str) -> VoterResult<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| VoterError::config_parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the result is invalid.
    pub fn from_json_str(text: &str) -> VoterResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| VoterError::config_parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension.
    ///
    /// `.json` is parsed as JSON; `.yaml`, `.yml` and anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or is
    /// invalid.
    pub fn load(path: &Path) -> VoterResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| VoterError::config_io(path, e.to_string()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!(path = %path.display(), ?config, "Loaded voter configuration");
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> VoterConfigBuilder {
        VoterConfigBuilder::default()
    }
}

/// Builder for `VoterConfig`.
#[derive(Debug, Default)]
pub struct VoterConfigBuilder {
    config: VoterConfig,
}

impl VoterConfigBuilder {
    /// Set the sample mask.
    #[must_use]
    pub fn mask(mut self, mask: u16) -> Self {
        self.config.mask = mask;
        self
    }

    /// Set the receive timeout in milliseconds.
    #[must_use]
    pub fn receive_timeout_ms(mut self, ms: u64) -> Self {
        self.config.receive_timeout_ms = ms;
        self
    }

    /// Set the send timeout in milliseconds.
    #[must_use]
    pub fn send_timeout_ms(mut self, ms: u64) -> Self {
        self.config.send_timeout_ms = ms;
        self
    }

    /// Set the classification window length.
    #[must_use]
    pub fn window_len(mut self, cycles: u32) -> Self {
        self.config.window_len = cycles;
        self
    }

    /// Set the pairwise deviation threshold.
    #[must_use]
    pub fn deviation_threshold(mut self, threshold: u16) -> Self {
        self.config.deviation_threshold = threshold;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> VoterResult<VoterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
