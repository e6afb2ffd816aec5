// Entropy Engine Testdata - Live pacing
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Wall-clock pacing for live emission.
//!
//! Each target is the previous actual emission time plus the clock period
//! plus a jitter of at most `±uf · 15%` of the period. Targets never fall
//! in the past. The pacer owns its own random stream so jitter never
//! changes the generated values.

use crate::config::{StreamConfig, MAX_CLOCK_PERIOD};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Jitter bound as a fraction of the period at `uf = 1`.
pub const JITTER_FRACTION: f64 = 0.15;

/// Mixed into the seed so the jitter stream differs from the value stream.
const JITTER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Schedules live emissions.
#[derive(Debug, Clone)]
pub struct Pacer {
    period: f64,
    jitter: f64,
    rng: StdRng,
    last_emit: Instant,
}

impl Pacer {
    /// Pacer with `period` seconds between emissions, starting at `start`.
    ///
    /// The period is clamped to `[0, MAX_CLOCK_PERIOD]`.
    pub fn new(period: f64, uf: f64, seed: u64, start: Instant) -> Self {
        let period = if period.is_nan() {
            0.0
        } else {
            period.clamp(0.0, MAX_CLOCK_PERIOD)
        };
        Self {
            period,
            jitter: uf.clamp(0.0, 1.0) * JITTER_FRACTION,
            rng: StdRng::seed_from_u64(seed ^ JITTER_STREAM),
            last_emit: start,
        }
    }

    pub fn from_config(config: &StreamConfig, start: Instant) -> Self {
        Self::new(
            config.clock_period,
            config.unexpected_factor,
            config.seed,
            start,
        )
    }

    /// Delay until the next emission, jitter included.
    pub fn next_delay(&mut self) -> Duration {
        let offset = if self.jitter > 0.0 {
            self.rng.gen_range(-1.0..=1.0) * self.jitter * self.period
        } else {
            0.0
        };
        Duration::from_secs_f64((self.period + offset).max(0.0))
    }

    /// Next target instant, never earlier than `now`.
    pub fn next_target(&mut self, now: Instant) -> Instant {
        let target = self.last_emit + self.next_delay();
        target.max(now)
    }

    /// Record the actual emission time.
    pub fn mark_emitted(&mut self, at: Instant) {
        self.last_emit = at;
    }

    pub fn last_emit(&self) -> Instant {
        self.last_emit
    }
}
