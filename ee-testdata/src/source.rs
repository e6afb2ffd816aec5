// Entropy Engine Testdata - Sample sources
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! In-process sample sources for the entropy engine.

use crate::config::StreamConfig;
use crate::error::Result;
use crate::generator::{Generator, GeneratorCounters, Value};
use entropy_engine::SampleSource;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use xxhash_rust::xxh64::xxh64;

/// Map a token to a stable float in `[-1, 1)`.
pub fn encode_token(token: &str) -> f64 {
    // Top 53 bits give an exact fraction in [0, 1)
    let u = (xxh64(token.as_bytes(), 0) >> 11) as f64 / (1u64 << 53) as f64;
    2.0 * u - 1.0
}

/// Numeric reading of a generated value. Tokens go through [`encode_token`].
pub fn value_to_sample(value: Value) -> f64 {
    match value {
        Value::Number(x) => x,
        Value::Token(c) => {
            let mut buf = [0u8; 4];
            encode_token(c.encode_utf8(&mut buf))
        }
    }
}

/// Polls a [`Generator`] once per tick without sleeping.
///
/// Dropped slots repeat the previous sample.
#[derive(Debug, Clone)]
pub struct GeneratorSource {
    generator: Generator,
    step: u64,
    held: f64,
}

impl GeneratorSource {
    pub fn new(config: StreamConfig) -> Result<Self> {
        Ok(Self::from_generator(Generator::new(config)?))
    }

    pub fn from_generator(generator: Generator) -> Self {
        Self {
            generator,
            step: 0,
            held: 0.0,
        }
    }

    pub fn counters(&self) -> GeneratorCounters {
        self.generator.counters()
    }

    /// Steps polled so far.
    pub fn steps(&self) -> u64 {
        self.step
    }
}

impl SampleSource for GeneratorSource {
    fn next_sample(&mut self) -> Option<f64> {
        let emission = self.generator.poll(self.step);
        self.step += 1;
        if let Some(value) = emission.value() {
            self.held = value_to_sample(value);
        }
        Some(self.held)
    }

    fn name(&self) -> &str {
        "generator"
    }
}

/// Mean-reverting random walk: `x ← 0.98·x + drift + N(0, noise)`.
#[derive(Debug, Clone)]
pub struct RandomWalkSource {
    x: f64,
    drift: f64,
    noise: Option<Normal<f64>>,
    rng: StdRng,
}

impl RandomWalkSource {
    /// Decay applied to the previous position each step.
    pub const DECAY: f64 = 0.98;

    pub fn new(seed: u64, drift: f64, noise: f64) -> Self {
        Self {
            x: 0.0,
            drift,
            noise: Normal::new(0.0, noise.abs()).ok().filter(|_| noise != 0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> f64 {
        self.x
    }
}

impl SampleSource for RandomWalkSource {
    fn next_sample(&mut self) -> Option<f64> {
        let step = self.noise.map_or(0.0, |n| n.sample(&mut self.rng));
        self.x = Self::DECAY * self.x + self.drift + step;
        Some(self.x)
    }

    fn name(&self) -> &str {
        "random"
    }
}
