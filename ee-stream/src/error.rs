// Entropy Engine Stream - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the stream layer.
//!
//! [`DecodeError`] and [`TransportError`] never leave the reader task: a bad
//! line is dropped and a broken connection is retried. [`StreamError`] is
//! what the command-line surfaces report at startup.

use std::time::Duration;
use thiserror::Error;

/// A line that could not be turned into a sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("non-finite value: {0}")]
    NonFinite(f64),

    /// JSON object without a numeric `value` field.
    #[error("bad envelope: {0}")]
    Envelope(String),

    #[error("line longer than {max} bytes")]
    LineTooLong { max: usize },
}

/// Connection-level failure, recovered by reconnecting.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Startup and surface errors.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("engine configuration: {0}")]
    Engine(#[from] entropy_engine::ConfigError),

    #[error("generator configuration: {0}")]
    Generator(#[from] ee_testdata::ConfigError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for stream surfaces.
pub type Result<T> = std::result::Result<T, StreamError>;
