// Entropy Engine Testdata - Stochastic generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Synthetic stochastic stream generator.
//!
//! The value sequence depends only on the seed, the configuration and the
//! logical times it is sampled at. Wall-clock pacing lives in
//! [`crate::pacing`] and draws from its own random stream.
//!
//! Perturbations for numeric and mixed streams, all scaled by the
//! unexpected factor `uf`:
//!
//! | Perturbation   | Rule                                            |
//! |----------------|-------------------------------------------------|
//! | noise          | `N(0, 0.25·uf)`                                 |
//! | spike          | probability `0.05·uf²`, magnitude `±(2 + 8·uf)` |
//! | regime switch  | every `max(5, 30·max(0.1, 1 − uf))` time units  |
//! | dropout        | probability `0.01·uf`                           |
//! | duplicate      | probability `0.01·uf`                           |
//!
//! At `uf = 0` none of them fire and no random numbers are drawn.

use crate::config::{Datatype, StreamConfig};
use crate::error::Result;
use crate::patterns::{mixed_symbol_at, numeric_baseline, Alphabet};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest regime interval in logical time units.
pub const MIN_REGIME_INTERVAL: f64 = 5.0;
/// Regime interval at `uf = 0` before the floor applies.
pub const BASE_REGIME_INTERVAL: f64 = 30.0;
/// Share of mixed-stream emissions that are symbols.
pub const MIXED_SYMBOL_RATE: f64 = 0.25;

/// One generated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Token(char),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Token(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", x),
            Value::Token(c) => write!(f, "{}", c),
        }
    }
}

/// Outcome of one emission slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Nothing is emitted this slot.
    Dropped,
    Single(Value),
    /// The same value is emitted twice in this slot.
    Duplicated(Value),
}

impl Emission {
    /// Value carried by this slot, if any.
    pub fn value(&self) -> Option<Value> {
        match self {
            Emission::Dropped => None,
            Emission::Single(v) | Emission::Duplicated(v) => Some(*v),
        }
    }

    /// Number of lines this slot puts on the wire.
    pub fn copies(&self) -> usize {
        match self {
            Emission::Dropped => 0,
            Emission::Single(_) => 1,
            Emission::Duplicated(_) => 2,
        }
    }
}

/// Running counters, serialized as the shutdown summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratorCounters {
    /// Values put on the wire, duplicates included.
    #[serde(rename = "samples_emitted")]
    pub emitted: u64,
    pub spikes: u64,
    pub regime_switches: u64,
    #[serde(rename = "dropouts")]
    pub dropped: u64,
    #[serde(rename = "duplicates")]
    pub duplicated: u64,
}

impl GeneratorCounters {
    /// Shutdown summary as a single JSON line.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Seeded generator with its own random state.
#[derive(Debug, Clone)]
pub struct Generator {
    config: StreamConfig,
    rng: StdRng,
    noise: Option<Normal<f64>>,
    regime_bias: f64,
    next_regime_at: Option<f64>,
    cursor: usize,
    counters: GeneratorCounters,
}

impl Generator {
    /// Create a generator. Fails on out-of-range configuration.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let uf = config.unexpected_factor;
        let noise = if uf > 0.0 {
            Normal::new(0.0, 0.25 * uf).ok()
        } else {
            None
        };
        let next_regime_at = (uf > 0.0).then(|| regime_interval(uf));
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            noise,
            regime_bias: 0.0,
            next_regime_at,
            cursor: 0,
            counters: GeneratorCounters::default(),
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn counters(&self) -> GeneratorCounters {
        self.counters
    }

    /// Current additive regime bias.
    pub fn regime_bias(&self) -> f64 {
        self.regime_bias
    }

    /// Logical time of live slot `slot`.
    pub fn slot_time(&self, slot: u64) -> f64 {
        slot as f64 * self.config.clock_period
    }

    /// Emission for live slot `slot`.
    pub fn tick(&mut self, slot: u64) -> Emission {
        self.emit_at(self.slot_time(slot))
    }

    /// Emission for in-process step `step`, at `step × module_dt`.
    pub fn poll(&mut self, step: u64) -> Emission {
        self.emit_at(step as f64 * self.config.module_dt)
    }

    /// Sample the stream at logical time `t`, then decide dropout and
    /// duplication. Counters are updated.
    pub fn emit_at(&mut self, t: f64) -> Emission {
        let value = self.sample_at(t);
        let p = 0.01 * self.config.unexpected_factor;
        if p > 0.0 && self.rng.gen::<f64>() < p {
            self.counters.dropped += 1;
            return Emission::Dropped;
        }
        if p > 0.0 && self.rng.gen::<f64>() < p {
            self.counters.duplicated += 1;
            self.counters.emitted += 2;
            return Emission::Duplicated(value);
        }
        self.counters.emitted += 1;
        Emission::Single(value)
    }

    /// Value at logical time `t`, without dropout or duplication.
    pub fn sample_at(&mut self, t: f64) -> Value {
        match self.config.datatype {
            Datatype::Numeric => Value::Number(self.numeric_at(t)),
            Datatype::Alphabetic => Value::Token(self.next_symbol(Alphabet::LETTERS)),
            Datatype::Symbolic => Value::Token(self.next_symbol(Alphabet::SYMBOLS)),
            Datatype::Mixed => {
                let x = self.numeric_at(t);
                if self.config.unexpected_factor > 0.0 && self.rng.gen::<f64>() < MIXED_SYMBOL_RATE {
                    let c = mixed_symbol_at(self.cursor);
                    self.cursor += 1;
                    Value::Token(c)
                } else {
                    Value::Number(x)
                }
            }
        }
    }

    fn next_symbol(&mut self, alphabet: Alphabet) -> char {
        let c = alphabet.symbol_at(self.cursor);
        self.cursor += 1;
        c
    }

    fn numeric_at(&mut self, t: f64) -> f64 {
        let uf = self.config.unexpected_factor;
        self.maybe_switch_regime(t);
        let mut x = numeric_baseline(t) + self.regime_bias;
        if let Some(noise) = self.noise {
            x += noise.sample(&mut self.rng);
        }
        let spike_p = 0.05 * uf * uf;
        if spike_p > 0.0 && self.rng.gen::<f64>() < spike_p {
            let sign = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
            x += sign * (2.0 + 8.0 * uf);
            self.counters.spikes += 1;
        }
        x
    }

    fn maybe_switch_regime(&mut self, t: f64) {
        let Some(due) = self.next_regime_at else {
            return;
        };
        if t < due {
            return;
        }
        let uf = self.config.unexpected_factor;
        self.regime_bias = self.rng.gen_range(-1.0..1.0) * (0.5 + uf);
        self.next_regime_at = Some(t + regime_interval(uf));
        self.counters.regime_switches += 1;
    }
}

/// Logical time between regime switches for a given `uf`.
pub fn regime_interval(uf: f64) -> f64 {
    (BASE_REGIME_INTERVAL * (1.0 - uf).max(0.1)).max(MIN_REGIME_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(datatype: Datatype, uf: f64) -> StreamConfig {
        StreamConfig::new()
            .with_datatype(datatype)
            .with_unexpected_factor(uf)
            .with_seed(7)
    }

    #[test]
    fn test_regime_interval() {
        assert_relative_eq!(regime_interval(0.0), 30.0);
        assert_relative_eq!(regime_interval(0.5), 15.0);
        assert_relative_eq!(regime_interval(1.0), 5.0);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Generator::new(config(Datatype::Numeric, -0.1)).is_err());
    }

    #[test]
    fn test_pure_baseline_at_zero_uf() {
        let mut gen = Generator::new(config(Datatype::Numeric, 0.0)).unwrap();
        for step in 0..5000 {
            let t = step as f64 * 0.05;
            assert_eq!(gen.poll(step), Emission::Single(Value::Number(numeric_baseline(t))));
        }
        let c = gen.counters();
        assert_eq!(c.spikes, 0);
        assert_eq!(c.dropped, 0);
        assert_eq!(c.duplicated, 0);
        assert_eq!(c.regime_switches, 0);
        assert_eq!(c.emitted, 5000);
    }

    #[test]
    fn test_alphabetic_cycle() {
        let mut gen = Generator::new(config(Datatype::Alphabetic, 0.0)).unwrap();
        let out: String = (0..28)
            .filter_map(|s| match gen.poll(s).value() {
                Some(Value::Token(c)) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(out, "abcdefghijklmnopqrstuvwxyzab");
    }

    #[test]
    fn test_symbolic_tokens_stay_in_alphabet() {
        let mut gen = Generator::new(config(Datatype::Symbolic, 1.0)).unwrap();
        for s in 0..500 {
            if let Some(Value::Token(c)) = gen.poll(s).value() {
                assert!(crate::patterns::SYMBOLS.contains(c));
            }
        }
    }

    #[test]
    fn test_mixed_emits_both_kinds() {
        let mut gen = Generator::new(config(Datatype::Mixed, 0.5)).unwrap();
        let values: Vec<Value> = (0..2000).filter_map(|s| gen.poll(s).value()).collect();
        let tokens = values.iter().filter(|v| v.as_number().is_none()).count();
        assert!(tokens > 300 && tokens < 700, "tokens = {}", tokens);
    }

    #[test]
    fn test_regime_switches_at_full_uf() {
        let mut gen = Generator::new(config(Datatype::Numeric, 1.0).with_module_dt(0.5)).unwrap();
        // 100 time units at uf = 1 means a switch every 5 units
        for step in 0..=200 {
            gen.poll(step);
        }
        assert_eq!(gen.counters().regime_switches, 20);
        assert!(gen.regime_bias().abs() <= 1.5);
    }

    #[test]
    fn test_emitted_counts_duplicates_twice() {
        let mut gen = Generator::new(config(Datatype::Numeric, 1.0)).unwrap();
        let mut lines = 0u64;
        for step in 0..20_000 {
            lines += gen.poll(step).copies() as u64;
        }
        let c = gen.counters();
        assert_eq!(c.emitted, lines);
        assert_eq!(c.emitted + c.dropped, 20_000 + c.duplicated);
        assert!(c.dropped > 0);
        assert!(c.duplicated > 0);
        assert!(c.spikes > 0);
    }

    #[test]
    fn test_summary_keys() {
        let json = GeneratorCounters {
            emitted: 10,
            spikes: 1,
            regime_switches: 2,
            dropped: 3,
            duplicated: 4,
        }
        .to_json()
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["samples_emitted"], 10);
        assert_eq!(v["spikes"], 1);
        assert_eq!(v["regime_switches"], 2);
        assert_eq!(v["dropouts"], 3);
        assert_eq!(v["duplicates"], 4);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Token('#').to_string(), "#");
    }
}
