// Entropy Engine Testdata - Baseline patterns
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Deterministic baselines the perturbations are layered on.

use std::f64::consts::{PI, SQRT_2};

/// Lowercase latin letters.
pub const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
/// Punctuation alphabet.
pub const SYMBOLS: &str = "!@#$%^&*?-+=:;";

/// Slow linear drift per unit of logical time.
pub const DRIFT_RATE: f64 = 0.001;

/// Numeric baseline at logical time `t`.
///
/// Three sinusoids with pairwise incommensurate frequencies plus a slow
/// linear drift, so the sequence never repeats.
pub fn numeric_baseline(t: f64) -> f64 {
    (2.0 * t).sin() + 0.7 * (PI * SQRT_2 * t).sin() + 0.05 * (0.1 * t).sin() + DRIFT_RATE * t
}

/// Cyclic traversal of a fixed alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    chars: &'static str,
}

impl Alphabet {
    pub const LETTERS: Alphabet = Alphabet { chars: LETTERS };
    pub const SYMBOLS: Alphabet = Alphabet { chars: SYMBOLS };

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Symbol at cursor position `k`, wrapping around.
    pub fn symbol_at(&self, k: usize) -> char {
        let bytes = self.chars.as_bytes();
        bytes[k % bytes.len()] as char
    }

    pub fn as_str(&self) -> &'static str {
        self.chars
    }
}

/// Letters followed by symbols, used by mixed streams.
pub fn mixed_symbol_at(k: usize) -> char {
    let total = LETTERS.len() + SYMBOLS.len();
    let k = k % total;
    if k < LETTERS.len() {
        Alphabet::LETTERS.symbol_at(k)
    } else {
        Alphabet::SYMBOLS.symbol_at(k - LETTERS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_baseline_at_origin() {
        assert_eq!(numeric_baseline(0.0), 0.0);
    }

    #[test]
    fn test_baseline_drift() {
        // Drift dominates the mean over a long span
        let n = 20_000;
        let mean_a: f64 = (0..n).map(|i| numeric_baseline(i as f64 * 0.05)).sum::<f64>() / n as f64;
        let mean_b: f64 = (0..n)
            .map(|i| numeric_baseline(10_000.0 + i as f64 * 0.05))
            .sum::<f64>()
            / n as f64;
        assert_relative_eq!(mean_b - mean_a, 10.0, epsilon = 0.2);
    }

    #[test]
    fn test_alphabet_wraps() {
        assert_eq!(Alphabet::LETTERS.symbol_at(0), 'a');
        assert_eq!(Alphabet::LETTERS.symbol_at(25), 'z');
        assert_eq!(Alphabet::LETTERS.symbol_at(26), 'a');
        assert_eq!(Alphabet::SYMBOLS.symbol_at(0), '!');
        assert_eq!(Alphabet::SYMBOLS.len(), 14);
    }

    #[test]
    fn test_mixed_alphabet() {
        assert_eq!(mixed_symbol_at(0), 'a');
        assert_eq!(mixed_symbol_at(26), '!');
        assert_eq!(mixed_symbol_at(40), 'a');
    }
}
