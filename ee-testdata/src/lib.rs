// Entropy Engine Testdata - Synthetic stochastic streams
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Entropy Engine Testdata
//!
//! Synthetic stochastic streams for exercising the entropy engine.
//!
//! A single scalar, the *unexpected factor* `uf ∈ [0, 1]`, controls how
//! disordered the stream is: noise, rare spikes, regime switches,
//! dropouts and duplicates all scale with it. At `uf = 0` the stream is
//! the pure deterministic baseline.
//!
//! ## Quick Start
//!
//! ```rust
//! use ee_testdata::{Datatype, Generator, StreamConfig};
//!
//! let config = StreamConfig::new()
//!     .with_datatype(Datatype::Numeric)
//!     .with_unexpected_factor(0.4)
//!     .with_seed(42);
//!
//! let mut generator = Generator::new(config).unwrap();
//! for step in 0..100 {
//!     let _ = generator.poll(step);
//! }
//! println!("{}", generator.counters().to_json().unwrap());
//! ```
//!
//! ## Modes
//!
//! - **Polled**: [`Generator::poll`] or [`GeneratorSource`], logical time
//!   `step × module_dt`, no sleeping.
//! - **Live**: [`Generator::tick`] paced by a [`Pacer`], logical time
//!   `slot × clock_period`.

pub mod config;
pub mod error;
pub mod generator;
pub mod pacing;
pub mod patterns;
pub mod source;

// Re-exports for convenience
pub use config::{Datatype, StreamConfig, MAX_CLOCK_PERIOD};
pub use error::{ConfigError, Result};
pub use generator::{Emission, Generator, GeneratorCounters, Value};
pub use pacing::Pacer;
pub use patterns::{numeric_baseline, Alphabet};
pub use source::{encode_token, value_to_sample, GeneratorSource, RandomWalkSource};
