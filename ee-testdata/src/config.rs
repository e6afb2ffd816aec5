// Entropy Engine Testdata - Generator configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generator configuration.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest accepted clock period in seconds.
pub const MAX_CLOCK_PERIOD: f64 = 86_400.0;

/// Kind of values a generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Sinusoid baseline with drift and perturbations.
    #[default]
    Numeric,
    /// Cyclic walk over `a..z`.
    Alphabetic,
    /// Cyclic walk over punctuation symbols.
    Symbolic,
    /// Numeric stream with occasional symbols.
    Mixed,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Numeric => "numeric",
            Datatype::Alphabetic => "alphabetic",
            Datatype::Symbolic => "symbolic",
            Datatype::Mixed => "mixed",
        }
    }

    /// Whether the value sequence carries the numeric perturbations.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Datatype::Numeric | Datatype::Mixed)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = ConfigError;

    /// Accepts the long names and the short forms `123|abc|sym|mix`,
    /// with or without a leading `--`.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches("--").to_ascii_lowercase();
        match name.as_str() {
            "numeric" | "123" => Ok(Datatype::Numeric),
            "alphabetic" | "abc" => Ok(Datatype::Alphabetic),
            "symbolic" | "sym" => Ok(Datatype::Symbolic),
            "mixed" | "mix" => Ok(Datatype::Mixed),
            _ => Err(ConfigError::UnknownDatatype(s.to_string())),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamConfig {
    pub datatype: Datatype,
    /// Seconds between emissions in live mode.
    pub clock_period: f64,
    /// Seconds before a live generator stops. 0 means unbounded.
    pub total_runtime: f64,
    /// Disorder knob in [0, 1].
    pub unexpected_factor: f64,
    pub seed: u64,
    /// Logical seconds per step when polled in-process.
    pub module_dt: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            datatype: Datatype::Numeric,
            clock_period: 0.05,
            total_runtime: 0.0,
            unexpected_factor: 0.3,
            seed: 42,
            module_dt: 0.05,
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datatype(mut self, datatype: Datatype) -> Self {
        self.datatype = datatype;
        self
    }

    pub fn with_clock_period(mut self, secs: f64) -> Self {
        self.clock_period = secs;
        self
    }

    pub fn with_total_runtime(mut self, secs: f64) -> Self {
        self.total_runtime = secs;
        self
    }

    pub fn with_unexpected_factor(mut self, uf: f64) -> Self {
        self.unexpected_factor = uf;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_module_dt(mut self, dt: f64) -> Self {
        self.module_dt = dt;
        self
    }

    /// Check every parameter range.
    pub fn validate(&self) -> Result<()> {
        let uf = self.unexpected_factor;
        if !(0.0..=1.0).contains(&uf) {
            return Err(ConfigError::UnexpectedFactorOutOfRange { uf });
        }
        if !(self.clock_period.is_finite() && self.clock_period > 0.0) {
            return Err(ConfigError::NonPositiveClock {
                period: self.clock_period,
            });
        }
        if self.clock_period > MAX_CLOCK_PERIOD {
            return Err(ConfigError::ClockTooLong {
                period: self.clock_period,
                max: MAX_CLOCK_PERIOD,
            });
        }
        if !(self.total_runtime.is_finite() && self.total_runtime >= 0.0) {
            return Err(ConfigError::NegativeRuntime {
                runtime: self.total_runtime,
            });
        }
        if Duration::try_from_secs_f64(self.total_runtime).is_err() {
            return Err(ConfigError::RuntimeTooLong {
                runtime: self.total_runtime,
            });
        }
        if !(self.module_dt.is_finite() && self.module_dt > 0.0) {
            return Err(ConfigError::NonPositiveModuleDt { dt: self.module_dt });
        }
        Ok(())
    }

    /// Configured runtime, `None` when unbounded.
    ///
    /// A runtime too long for a [`Duration`] saturates at [`Duration::MAX`].
    pub fn runtime(&self) -> Option<Duration> {
        (self.total_runtime > 0.0)
            .then(|| Duration::try_from_secs_f64(self.total_runtime).unwrap_or(Duration::MAX))
    }

    /// True once `elapsed` reaches the configured runtime.
    pub fn runtime_exceeded(&self, elapsed: Duration) -> bool {
        matches!(self.runtime(), Some(limit) if elapsed >= limit)
    }
}
