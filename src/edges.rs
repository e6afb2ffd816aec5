// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Bin edge policies.
//!
//! A policy partitions the value domain into `B` equal-width bins. Both
//! policies expose the same `rebin` operation so the histogram and entropy
//! math stay shared:
//!
//! - [`EdgePolicy::Fixed`]: edges over `[0, 1]`, derived once. Inputs are
//!   clamped into range, so no value ever forces a recomputation.
//! - [`EdgePolicy::Adaptive`]: edges follow the window's min/max with 5%
//!   padding on each side, recomputed whenever a value falls outside the
//!   current coverage.

use serde::{Deserialize, Serialize};

/// Fraction of the span added below the minimum and above the maximum.
pub const ADAPTIVE_PADDING: f64 = 0.05;

/// Half-width used when every value in the window is identical.
pub const DEGENERATE_HALF_SPAN: f64 = 0.5;

/// Bin edge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Constant edges over `[0, 1]`.
    #[default]
    Fixed,
    /// Edges recomputed from window min/max when coverage is exceeded.
    Adaptive,
}

impl EdgePolicy {
    /// Compute edges for the given window contents.
    pub fn rebin<I>(&self, window: I, bins: usize) -> BinEdges
    where
        I: IntoIterator<Item = f64>,
    {
        match self {
            EdgePolicy::Fixed => BinEdges::uniform(0.0, 1.0, bins),
            EdgePolicy::Adaptive => {
                let (mut lo, mut hi) = window
                    .into_iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                        (lo.min(x), hi.max(x))
                    });
                if lo > hi {
                    // Empty window
                    lo = 0.0;
                    hi = 0.0;
                }
                if lo == hi {
                    lo -= DEGENERATE_HALF_SPAN;
                    hi += DEGENERATE_HALF_SPAN;
                }
                let pad = ADAPTIVE_PADDING * (hi - lo);
                BinEdges::uniform(lo - pad, hi + pad, bins)
            }
        }
    }

    /// Whether `x` requires new edges before it can be counted.
    pub fn needs_rebin(&self, edges: Option<&BinEdges>, x: f64) -> bool {
        match (self, edges) {
            (_, None) => true,
            (EdgePolicy::Fixed, Some(_)) => false,
            (EdgePolicy::Adaptive, Some(edges)) => !edges.covers(x),
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgePolicy::Fixed => "fixed",
            EdgePolicy::Adaptive => "adaptive",
        }
    }
}

impl std::str::FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(EdgePolicy::Fixed),
            "adaptive" => Ok(EdgePolicy::Adaptive),
            other => Err(format!("unknown edge policy '{}' (fixed|adaptive)", other)),
        }
    }
}

/// `bins + 1` increasing, equally spaced boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinEdges {
    lower: f64,
    upper: f64,
    bins: usize,
}

impl BinEdges {
    /// Equal-width edges over `[lower, upper]`.
    pub fn uniform(lower: f64, upper: f64, bins: usize) -> Self {
        Self { lower, upper, bins }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// All boundaries, first to last.
    pub fn boundaries(&self) -> Vec<f64> {
        let width = (self.upper - self.lower) / self.bins as f64;
        (0..=self.bins)
            .map(|i| {
                if i == self.bins {
                    self.upper
                } else {
                    self.lower + width * i as f64
                }
            })
            .collect()
    }

    /// Whether `x` lies inside `[lower, upper]`.
    pub fn covers(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Bin for `x`, clamped into `[0, bins - 1]`.
    ///
    /// For `[0, 1]` edges this is exactly `floor(clamp(x, 0, 1) * bins)`.
    /// The upper boundary belongs to the last bin.
    pub fn bin_index(&self, x: f64) -> usize {
        let span = self.upper - self.lower;
        if span.is_nan() || span <= 0.0 {
            return 0;
        }
        let clamped = x.clamp(self.lower, self.upper);
        let scaled = ((clamped - self.lower) / span * self.bins as f64).floor();
        // NaN casts to 0
        (scaled as usize).min(self.bins - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_edges_ignore_window() {
        let edges = EdgePolicy::Fixed.rebin(vec![10.0, 20.0], 4);
        assert_eq!(edges.lower(), 0.0);
        assert_eq!(edges.upper(), 1.0);
        assert_eq!(edges.boundaries(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_fixed_bin_index_matches_floor_formula() {
        let edges = EdgePolicy::Fixed.rebin(std::iter::empty(), 4);
        assert_eq!(edges.bin_index(0.0), 0);
        assert_eq!(edges.bin_index(0.25), 1);
        assert_eq!(edges.bin_index(0.5), 2);
        assert_eq!(edges.bin_index(0.75), 3);
        assert_eq!(edges.bin_index(1.0), 3);
        assert_eq!(edges.bin_index(-3.0), 0);
        assert_eq!(edges.bin_index(7.0), 3);
    }

    #[test]
    fn test_fixed_never_rebins_after_first() {
        let edges = EdgePolicy::Fixed.rebin(std::iter::empty(), 4);
        assert!(EdgePolicy::Fixed.needs_rebin(None, 0.5));
        assert!(!EdgePolicy::Fixed.needs_rebin(Some(&edges), 42.0));
    }

    #[test]
    fn test_adaptive_padding() {
        let edges = EdgePolicy::Adaptive.rebin(vec![0.0, 10.0, 5.0], 10);
        assert_relative_eq!(edges.lower(), -0.5);
        assert_relative_eq!(edges.upper(), 10.5);
        assert_eq!(edges.boundaries().len(), 11);
    }

    #[test]
    fn test_adaptive_degenerate_span() {
        let edges = EdgePolicy::Adaptive.rebin(vec![5.0, 5.0, 5.0], 4);
        // +-0.5, then 5% of the 1.0 span on each side
        assert_relative_eq!(edges.lower(), 4.45);
        assert_relative_eq!(edges.upper(), 5.55);
        assert!(edges.covers(5.0));
    }

    #[test]
    fn test_adaptive_rebins_outside_coverage() {
        let edges = EdgePolicy::Adaptive.rebin(vec![0.0, 1.0], 4);
        assert!(!EdgePolicy::Adaptive.needs_rebin(Some(&edges), 0.5));
        assert!(!EdgePolicy::Adaptive.needs_rebin(Some(&edges), 1.04));
        assert!(EdgePolicy::Adaptive.needs_rebin(Some(&edges), 1.2));
        assert!(EdgePolicy::Adaptive.needs_rebin(Some(&edges), -0.2));
    }

    #[test]
    fn test_boundaries_increasing() {
        let edges = EdgePolicy::Adaptive.rebin(vec![-3.0, 2.0], 7);
        let b = edges.boundaries();
        assert!(b.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*b.last().unwrap(), edges.upper());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fixed".parse::<EdgePolicy>(), Ok(EdgePolicy::Fixed));
        assert_eq!("Adaptive".parse::<EdgePolicy>(), Ok(EdgePolicy::Adaptive));
        assert!("auto".parse::<EdgePolicy>().is_err());
    }
}
