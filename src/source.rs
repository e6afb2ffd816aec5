// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sample source abstraction
//!
//! A source yields one scalar per engine tick. The engine never waits on a
//! source: implementations that read from I/O must return their last known
//! value instead of blocking.

use serde::{Deserialize, Serialize};

/// Producer of one sample per tick.
pub trait SampleSource {
    /// Sample for this tick, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> Option<f64>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "source"
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_sample(&mut self) -> Option<f64> {
        (**self).next_sample()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Behaviour of a [`ReplaySource`] after its last value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayEnd {
    /// Start again from the first value.
    #[default]
    Loop,
    /// Keep returning the last value.
    Hold,
    /// Report exhaustion.
    Stop,
}

/// Replays a fixed sequence of samples.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    values: Vec<f64>,
    position: usize,
    end: ReplayEnd,
}

impl ReplaySource {
    /// Create a replay over `values`.
    pub fn new(values: Vec<f64>, end: ReplayEnd) -> Self {
        Self {
            values,
            position: 0,
            end,
        }
    }

    /// Number of values in the sequence.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the next value to be returned.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewind to the first value.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl SampleSource for ReplaySource {
    fn next_sample(&mut self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        if self.position >= self.values.len() {
            match self.end {
                ReplayEnd::Loop => self.position = 0,
                ReplayEnd::Hold => return self.values.last().copied(),
                ReplayEnd::Stop => return None,
            }
        }
        let v = self.values[self.position];
        self.position += 1;
        Some(v)
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Adapter turning any iterator of samples into a source.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I: Iterator<Item = f64>> IterSource<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator<Item = f64>> SampleSource for IterSource<I> {
    fn next_sample(&mut self) -> Option<f64> {
        self.inner.next()
    }

    fn name(&self) -> &str {
        "iter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut impl SampleSource, n: usize) -> Vec<Option<f64>> {
        (0..n).map(|_| source.next_sample()).collect()
    }

    #[test]
    fn test_replay_loop() {
        let mut src = ReplaySource::new(vec![1.0, 2.0], ReplayEnd::Loop);
        assert_eq!(
            drain(&mut src, 5),
            vec![Some(1.0), Some(2.0), Some(1.0), Some(2.0), Some(1.0)]
        );
    }

    #[test]
    fn test_replay_hold() {
        let mut src = ReplaySource::new(vec![1.0, 2.0], ReplayEnd::Hold);
        assert_eq!(
            drain(&mut src, 4),
            vec![Some(1.0), Some(2.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn test_replay_stop() {
        let mut src = ReplaySource::new(vec![1.0], ReplayEnd::Stop);
        assert_eq!(drain(&mut src, 3), vec![Some(1.0), None, None]);
        src.rewind();
        assert_eq!(src.next_sample(), Some(1.0));
    }

    #[test]
    fn test_empty_replay_is_exhausted() {
        let mut src = ReplaySource::new(Vec::new(), ReplayEnd::Loop);
        assert!(src.is_empty());
        assert_eq!(src.next_sample(), None);
    }

    #[test]
    fn test_boxed_source() {
        let mut src: Box<dyn SampleSource> =
            Box::new(IterSource::new([0.5, 0.25].into_iter()));
        assert_eq!(src.name(), "iter");
        assert_eq!(drain(&mut src, 3), vec![Some(0.5), Some(0.25), None]);
    }
}
