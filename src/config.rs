// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Engine configuration.

use crate::edges::EdgePolicy;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the entropy engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of histogram bins (>= 2).
    pub bins: usize,

    /// Sliding window length in samples (>= 2).
    pub window: usize,

    /// Seconds between successive samples, used for d/dt.
    pub dt: f64,

    /// EMA factor applied to raw entropy, in (0, 1]. 1.0 disables smoothing.
    pub ema: f64,

    /// Optional time scale T* for slope (× T*) and curvature (× T*²).
    #[serde(rename = "Tstar", skip_serializing_if = "Option::is_none")]
    pub tstar: Option<f64>,

    /// Bin edge policy.
    pub edges: EdgePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bins: 24,
            window: 180,
            dt: 0.25,
            ema: 1.0,
            tstar: None,
            edges: EdgePolicy::Fixed,
        }
    }
}

impl EngineConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bin count.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set window length.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set sample interval in seconds.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set EMA factor.
    pub fn with_ema(mut self, ema: f64) -> Self {
        self.ema = ema;
        self
    }

    /// Scale derivatives by T*.
    pub fn with_tstar(mut self, tstar: f64) -> Self {
        self.tstar = Some(tstar);
        self
    }

    /// Set bin edge policy.
    pub fn with_edges(mut self, edges: EdgePolicy) -> Self {
        self.edges = edges;
        self
    }

    /// Check every parameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        if self.bins < 2 {
            return Err(ConfigError::TooFewBins { bins: self.bins });
        }
        if self.window < 2 {
            return Err(ConfigError::WindowTooSmall {
                window: self.window,
            });
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::NonPositiveDt { dt: self.dt });
        }
        if !(self.ema > 0.0 && self.ema <= 1.0) {
            return Err(ConfigError::EmaOutOfRange { ema: self.ema });
        }
        if let Some(tstar) = self.tstar {
            if !(tstar.is_finite() && tstar >= 0.0) {
                return Err(ConfigError::NegativeTimeScale { tstar });
            }
        }
        Ok(())
    }

    /// Parse from JSON. The result is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
