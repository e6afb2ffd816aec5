// Entropy Engine Stream - Transport, generator server and monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Entropy Engine Stream
//!
//! I/O surfaces around the entropy engine:
//!
//! - [`codec`]: newline-delimited numeric / `{"value": n}` lines
//! - [`transport`]: resilient TCP client with sample-and-hold `next()`
//! - [`server`]: generator output over TCP or stdout
//! - [`csv_source`]: replay of a CSV `value` column
//! - [`monitor`]: tick loop writing one JSON record per line
//! - [`metrics`]: Prometheus gauges and the `/metrics` endpoint
//!
//! The computation core never sees I/O errors: the transport absorbs
//! them and keeps returning the last good value.

pub mod codec;
pub mod csv_source;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod server;
pub mod transport;

pub use codec::{decode_line, LineBuffer};
pub use error::{DecodeError, Result, StreamError, TransportError};
pub use monitor::{run_monitor, MonitorOptions, SourceKind};
pub use server::{emit_stdout, format_line, GeneratorServer, OutputFormat, StopReason};
pub use transport::{LatestValue, StatsSnapshot, TcpTransport, TransportConfig, TransportStats};
