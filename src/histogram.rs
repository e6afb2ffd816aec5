// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sliding window histogram.
//!
//! Keeps the last `W` samples together with the bin each one is currently
//! counted in. The invariant `sum(counts) == len(window)` holds after every
//! call to [`SlidingHistogram::update`].
//!
//! Under the adaptive policy a value outside the current edges triggers a
//! full rebuild: new edges from the window, every stored sample re-binned,
//! counts recomputed from scratch. Rebuilds are O(W) and counted in
//! [`SlidingHistogram::rebuilds`].

use crate::edges::{BinEdges, EdgePolicy};
use crate::entropy::normalized_entropy;
use crate::error::{ConfigError, Result};
use std::collections::VecDeque;

/// A stored sample and the bin it is counted in.
#[derive(Debug, Clone, Copy)]
struct Slot {
    value: f64,
    bin: usize,
}

/// Incremental histogram over a fixed-length sliding window.
#[derive(Debug, Clone)]
pub struct SlidingHistogram {
    bins: usize,
    window: usize,
    policy: EdgePolicy,
    edges: Option<BinEdges>,
    slots: VecDeque<Slot>,
    counts: Vec<usize>,
    rebuilds: u64,
}

impl SlidingHistogram {
    /// Create an empty histogram.
    pub fn new(bins: usize, window: usize, policy: EdgePolicy) -> Result<Self> {
        if bins < 2 {
            return Err(ConfigError::TooFewBins { bins });
        }
        if window < 2 {
            return Err(ConfigError::WindowTooSmall { window });
        }
        Ok(Self {
            bins,
            window,
            policy,
            edges: None,
            slots: VecDeque::with_capacity(window),
            counts: vec![0; bins],
            rebuilds: 0,
        })
    }

    /// Insert a sample, evicting the oldest if the window is full, and
    /// return the normalized entropy of the updated window.
    pub fn update(&mut self, x: f64) -> f64 {
        if self.slots.len() == self.window {
            if let Some(old) = self.slots.pop_front() {
                self.counts[old.bin] -= 1;
            }
        }

        if self.policy.needs_rebin(self.edges.as_ref(), x) {
            self.slots.push_back(Slot { value: x, bin: 0 });
            self.rebuild();
        } else {
            let bin = self.bin_of(x);
            self.slots.push_back(Slot { value: x, bin });
            self.counts[bin] += 1;
        }

        self.entropy()
    }

    /// Normalized entropy of the current window.
    pub fn entropy(&self) -> f64 {
        normalized_entropy(&self.counts)
    }

    /// Current bin counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Current edges (None before the first sample).
    pub fn edges(&self) -> Option<&BinEdges> {
        self.edges.as_ref()
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum window length.
    pub fn capacity(&self) -> usize {
        self.window
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Number of full edge recomputations so far (the first one included).
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Window values, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().map(|s| s.value)
    }

    /// Drop all samples. Edges are recomputed on the next update.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.edges = None;
    }

    fn bin_of(&self, x: f64) -> usize {
        match self.edges {
            Some(ref edges) => edges.bin_index(x),
            None => 0,
        }
    }

    fn rebuild(&mut self) {
        let edges = self
            .policy
            .rebin(self.slots.iter().map(|s| s.value), self.bins);
        self.counts.iter_mut().for_each(|c| *c = 0);
        for slot in self.slots.iter_mut() {
            slot.bin = edges.bin_index(slot.value);
            self.counts[slot.bin] += 1;
        }
        self.edges = Some(edges);
        self.rebuilds += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn total(h: &SlidingHistogram) -> usize {
        h.counts().iter().sum()
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            SlidingHistogram::new(1, 10, EdgePolicy::Fixed).unwrap_err(),
            ConfigError::TooFewBins { bins: 1 }
        );
        assert_eq!(
            SlidingHistogram::new(4, 1, EdgePolicy::Adaptive).unwrap_err(),
            ConfigError::WindowTooSmall { window: 1 }
        );
    }

    #[test]
    fn test_counts_track_window_length() {
        let mut h = SlidingHistogram::new(4, 3, EdgePolicy::Fixed).unwrap();
        for (i, x) in [0.1, 0.9, 0.4, 0.6, 0.2].iter().enumerate() {
            h.update(*x);
            assert_eq!(total(&h), (i + 1).min(3));
            assert_eq!(h.len(), (i + 1).min(3));
        }
    }

    #[test]
    fn test_fixed_eviction_decrements_old_bin() {
        let mut h = SlidingHistogram::new(4, 2, EdgePolicy::Fixed).unwrap();
        h.update(0.1);
        h.update(0.9);
        assert_eq!(h.counts(), &[1, 0, 0, 1]);
        h.update(0.6);
        assert_eq!(h.counts(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_fixed_clamps_out_of_range() {
        let mut h = SlidingHistogram::new(4, 4, EdgePolicy::Fixed).unwrap();
        h.update(-2.0);
        h.update(3.0);
        assert_eq!(h.counts(), &[1, 0, 0, 1]);
        assert_eq!(h.rebuilds(), 1);
    }

    #[test]
    fn test_adaptive_rebuild_on_new_extreme() {
        let mut h = SlidingHistogram::new(4, 8, EdgePolicy::Adaptive).unwrap();
        h.update(0.0);
        assert_eq!(h.rebuilds(), 1);
        h.update(0.2);
        assert_eq!(h.rebuilds(), 1);
        h.update(10.0);
        assert_eq!(h.rebuilds(), 2);
        assert_eq!(total(&h), 3);
        let edges = h.edges().unwrap();
        assert!(edges.covers(0.0) && edges.covers(10.0));
    }

    #[test]
    fn test_adaptive_eviction_after_rebuild_uses_current_bin() {
        let mut h = SlidingHistogram::new(4, 3, EdgePolicy::Adaptive).unwrap();
        h.update(0.0);
        h.update(0.1);
        h.update(100.0); // rebuild, first two samples collapse into bin 0
        assert_eq!(h.counts(), &[2, 0, 0, 1]);
        h.update(50.0); // evicts 0.0 from bin 0
        assert_eq!(h.counts(), &[1, 0, 1, 1]);
        assert_eq!(total(&h), 3);
    }

    #[test]
    fn test_adaptive_constant_window_zero_entropy() {
        let mut h = SlidingHistogram::new(6, 5, EdgePolicy::Adaptive).unwrap();
        let mut last = 1.0;
        for _ in 0..12 {
            last = h.update(5.0);
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_adaptive_uniform_spread_is_one() {
        let bins = 8;
        let mut h = SlidingHistogram::new(bins, bins, EdgePolicy::Adaptive).unwrap();
        let mut last = 0.0;
        for i in 0..bins {
            last = h.update((i as f64 + 0.5) / bins as f64);
        }
        assert!(h.counts().iter().all(|&c| c == 1));
        assert_relative_eq!(last, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clear_resets() {
        let mut h = SlidingHistogram::new(4, 4, EdgePolicy::Adaptive).unwrap();
        h.update(1.0);
        h.update(2.0);
        h.clear();
        assert!(h.is_empty());
        assert!(h.edges().is_none());
        assert_eq!(total(&h), 0);
        assert_eq!(h.entropy(), 0.0);
    }
}
