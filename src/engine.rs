// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! EntropyEngine - per-tick pipeline.
//!
//! `x → SlidingHistogram::update → H → DerivativeEngine::advance → (H̃, Y, Z)`.
//! The caller drives the clock; the engine never sleeps and never fails
//! once constructed.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::histogram::SlidingHistogram;
use crate::record::TickRecord;
use crate::smoother::DerivativeEngine;
use crate::source::SampleSource;

/// Windowed entropy estimator with smoothing and derivatives.
#[derive(Debug, Clone)]
pub struct EntropyEngine {
    config: EngineConfig,
    histogram: SlidingHistogram,
    smoother: DerivativeEngine,
    ticks: u64,
}

impl EntropyEngine {
    /// Create a new engine. Fails on any out-of-range parameter.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            histogram: SlidingHistogram::new(config.bins, config.window, config.edges)?,
            smoother: DerivativeEngine::new(config.ema, config.dt, config.tstar)?,
            config,
            ticks: 0,
        })
    }

    /// Consume one sample and produce this tick's record.
    pub fn update(&mut self, x: f64) -> TickRecord {
        let raw = self.histogram.update(x);
        let d = self.smoother.advance(raw);
        self.ticks += 1;
        TickRecord {
            t: self.ticks as f64 * self.config.dt,
            h: d.h,
            y: d.y,
            z: d.z,
            raw,
        }
    }

    /// Pull one sample from `source` and process it.
    /// Returns `None` when the source is exhausted.
    pub fn tick<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> Option<TickRecord> {
        source.next_sample().map(|x| self.update(x))
    }

    /// Turn this engine into an iterator of records over `samples`.
    pub fn records<I>(self, samples: I) -> Records<I::IntoIter>
    where
        I: IntoIterator<Item = f64>,
    {
        Records {
            engine: self,
            samples: samples.into_iter(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn histogram(&self) -> &SlidingHistogram {
        &self.histogram
    }

    /// Ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Discard window and smoothing state. Configuration is kept.
    pub fn reset(&mut self) {
        self.histogram.clear();
        self.smoother.reset();
        self.ticks = 0;
    }
}

/// Iterator produced by [`EntropyEngine::records`].
#[derive(Debug)]
pub struct Records<I> {
    engine: EntropyEngine,
    samples: I,
}

impl<I> Records<I> {
    /// Engine state after the records yielded so far.
    pub fn engine(&self) -> &EntropyEngine {
        &self.engine
    }
}

impl<I: Iterator<Item = f64>> Iterator for Records<I> {
    type Item = TickRecord;

    fn next(&mut self) -> Option<TickRecord> {
        self.samples.next().map(|x| self.engine.update(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.samples.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::EdgePolicy;
    use crate::error::ConfigError;
    use crate::source::{ReplayEnd, ReplaySource};

    fn unsmoothed(bins: usize, window: usize) -> EngineConfig {
        EngineConfig::new()
            .with_bins(bins)
            .with_window(window)
            .with_dt(1.0)
            .with_ema(1.0)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = EntropyEngine::new(unsmoothed(4, 4).with_dt(-1.0)).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveDt { .. }));
    }

    #[test]
    fn test_uniform_four_bins_reaches_one() {
        let mut engine = EntropyEngine::new(unsmoothed(4, 4)).unwrap();
        let mut last = None;
        for x in [0.0, 0.25, 0.5, 0.75] {
            last = Some(engine.update(x));
        }
        let last = last.unwrap();
        assert_eq!(last.h, 1.0);
        assert_eq!(last.t, 4.0);
    }

    #[test]
    fn test_time_advances_by_dt() {
        let mut engine = EntropyEngine::new(unsmoothed(4, 4).with_dt(0.25)).unwrap();
        let times: Vec<f64> = (0..3).map(|_| engine.update(0.5).t).collect();
        assert_eq!(times, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_tick_from_source() {
        let mut engine = EntropyEngine::new(unsmoothed(4, 4)).unwrap();
        let mut src = ReplaySource::new(vec![0.1, 0.9], ReplayEnd::Stop);
        assert!(engine.tick(&mut src).is_some());
        assert!(engine.tick(&mut src).is_some());
        assert!(engine.tick(&mut src).is_none());
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn test_records_iterator() {
        let engine = EntropyEngine::new(unsmoothed(4, 4)).unwrap();
        let records: Vec<TickRecord> = engine.records(vec![0.1; 6]).collect();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.h == 0.0));
    }

    #[test]
    fn test_reset_restarts_clock() {
        let config = unsmoothed(4, 4).with_edges(EdgePolicy::Adaptive);
        let mut engine = EntropyEngine::new(config).unwrap();
        engine.update(1.0);
        engine.update(2.0);
        engine.reset();
        assert_eq!(engine.ticks(), 0);
        assert!(engine.histogram().is_empty());
        let r = engine.update(3.0);
        assert_eq!(r.t, 1.0);
        assert_eq!(r.y, 0.0);
    }
}
