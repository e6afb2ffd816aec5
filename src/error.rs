// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the entropy engine
//!
//! Only construction can fail. Once an engine exists, every update succeeds.

use thiserror::Error;

/// Result type alias for engine construction
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid construction parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Histogram needs at least two bins
    #[error("Too few bins: {bins} (minimum 2)")]
    TooFewBins { bins: usize },

    /// Sliding window needs at least two samples
    #[error("Window too small: {window} (minimum 2)")]
    WindowTooSmall { window: usize },

    /// Sample interval must be strictly positive
    #[error("Sample interval must be > 0, got {dt}")]
    NonPositiveDt { dt: f64 },

    /// EMA factor outside (0, 1]
    #[error("EMA factor must be in (0, 1], got {ema}")]
    EmaOutOfRange { ema: f64 },

    /// Derivative time scale must be >= 0
    #[error("Time scale must be >= 0, got {tstar}")]
    NegativeTimeScale { tstar: f64 },

    /// Configuration document could not be parsed
    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
