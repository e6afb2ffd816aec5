//! # Entropy Engine
//!
//! Tick-by-tick normalized Shannon entropy over a sliding window of scalar
//! samples, with an EMA-smoothed value H̃ ∈ [0, 1] and its slope (Y) and
//! curvature (Z).
//!
//! ## Key Features
//!
//! - **O(1) histogram updates**: evict-oldest / insert-newest per tick
//! - **Two bin edge policies**: fixed `[0, 1]` range or adaptive min/max range
//! - **Real-time derivatives**: backward differences only, no lookahead
//! - **No I/O**: the caller drives the clock and supplies the samples
//!
//! ## Quick Start
//!
//! ```rust
//! use entropy_engine::{EngineConfig, EntropyEngine};
//!
//! let config = EngineConfig::new()
//!     .with_bins(4)
//!     .with_window(4)
//!     .with_dt(1.0)
//!     .with_ema(1.0);
//! let mut engine = EntropyEngine::new(config).unwrap();
//!
//! let mut last = None;
//! for x in [0.0, 0.25, 0.5, 0.75] {
//!     last = Some(engine.update(x));
//! }
//!
//! // One sample in each of the four bins
//! assert_eq!(last.unwrap().h, 1.0);
//! ```
//!
//! ## Modules
//!
//! - [`edges`]: Bin edge policies (fixed / adaptive)
//! - [`histogram`]: Sliding window histogram
//! - [`entropy`]: Normalized Shannon entropy from counts
//! - [`smoother`]: EMA smoothing, slope and curvature
//! - [`engine`]: Per-tick pipeline
//! - [`source`]: Sample source abstraction and replay
//! - [`record`]: Per-tick output record

// Modules
pub mod config;
pub mod edges;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod histogram;
pub mod record;
pub mod smoother;
pub mod source;

// Re-exports for convenient access
pub use config::EngineConfig;
pub use edges::{BinEdges, EdgePolicy};
pub use engine::{EntropyEngine, Records};
pub use entropy::normalized_entropy;
pub use error::{ConfigError, Result};
pub use histogram::SlidingHistogram;
pub use record::TickRecord;
pub use smoother::{DerivativeEngine, Derivatives};
pub use source::{IterSource, ReplayEnd, ReplaySource, SampleSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let mut engine = EntropyEngine::new(EngineConfig::default()).unwrap();
        let r = engine.update(0.5);
        assert_eq!(r.h, 0.0);
        assert_eq!(r.y, 0.0);
        assert_eq!(r.z, 0.0);
    }
}
