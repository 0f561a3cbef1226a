//! Flowgraph configuration.
//!
//! A [`FlowgraphConfig`] seeds one run: buffer size, spectrum block settings,
//! admission policy and front-end settings. Every field has a default, so an
//! empty TOML document is a valid configuration.
//!
//! ```toml
//! buffer_capacity = 65536
//! admission = "reject"
//!
//! [transform]
//! fft_size = 2048
//! window = "hann"
//! format = "interleaved_iq"
//! fft_shift = true
//! decimation = 1
//!
//! [frontend]
//! freq = 2480000000
//! sample_rate = 4000000
//! ```

use crate::frontend::{FrontendConfig, FrontendSettings};
use sdrflow_analysis::SpectrumConfig;
use sdrflow_core::FlowError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default sample-buffer capacity (64 KiB of i8 samples).
pub const DEFAULT_BUFFER_CAPACITY: usize = 65536;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The buffer cannot hold a single window.
    #[error("buffer capacity {capacity} is smaller than one window of {window} samples")]
    BufferTooSmall {
        /// Configured capacity.
        capacity: usize,
        /// Samples required per window.
        window: usize,
    },

    /// A block setting is out of range.
    #[error("invalid block setting: {0}")]
    Block(#[from] FlowError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// How the ingress gate handles a chunk that does not fit right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Reject immediately (`push` resolves to `false`).
    #[default]
    Reject,
    /// Suspend until the scheduler frees enough space or a stop is requested.
    Wait,
}

/// Settings for one flowgraph run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowgraphConfig {
    /// Sample-buffer capacity in i8 samples.
    pub buffer_capacity: usize,
    /// Spectrum block settings.
    pub transform: SpectrumConfig,
    /// Behaviour when the buffer is full.
    pub admission: AdmissionPolicy,
    /// Radio front-end settings exposed as block parameters.
    pub frontend: FrontendConfig,
}

impl Default for FlowgraphConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            transform: SpectrumConfig::default(),
            admission: AdmissionPolicy::Reject,
            frontend: FrontendConfig::default(),
        }
    }
}

impl FlowgraphConfig {
    /// Check every setting; the flowgraph refuses to start otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transform.validate()?;
        let window = self.transform.window_len();
        if self.buffer_capacity < window {
            return Err(ConfigError::BufferTooSmall {
                capacity: self.buffer_capacity,
                window,
            });
        }
        FrontendSettings::from_config(&self.frontend)?;
        Ok(())
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| ConfigError::write_file(path, e))
    }
}
