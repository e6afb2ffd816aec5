// Entropy Engine Testdata - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generator configuration errors.

use thiserror::Error;

/// Result type for generator construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid generator parameters. Fatal at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Unexpected factor must lie in [0, 1].
    #[error("unexpected factor must be in [0, 1], got {uf}")]
    UnexpectedFactorOutOfRange { uf: f64 },

    #[error("clock period must be > 0, got {period}")]
    NonPositiveClock { period: f64 },

    #[error("clock period must be at most {max}s, got {period}")]
    ClockTooLong { period: f64, max: f64 },

    #[error("total runtime must be >= 0, got {runtime}")]
    NegativeRuntime { runtime: f64 },

    #[error("total runtime of {runtime}s does not fit a duration")]
    RuntimeTooLong { runtime: f64 },

    /// Logical step of the polled source.
    #[error("module dt must be > 0, got {dt}")]
    NonPositiveModuleDt { dt: f64 },

    #[error("unknown datatype: {0}")]
    UnknownDatatype(String),
}
