// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! EMA smoothing and backward-difference derivatives.
//!
//! `H̃ₜ = α·Hₜ + (1 − α)·H̃ₜ₋₁`, seeded with the first raw value.
//!
//! - Slope `Y = (H̃ₜ − H̃ₜ₋₁) / dt`, 0 until two smoothed values exist.
//! - Curvature `Z = (H̃ₜ − 2·H̃ₜ₋₁ + H̃ₜ₋₂) / dt²`, 0 until three exist.
//!
//! Only backward differences are used: there is no lookahead, so every tick
//! is final as soon as it is produced. With a time scale `T*` set, `Y` is
//! multiplied by `T*` and `Z` by `T*²`.

use crate::error::{ConfigError, Result};

/// Smoothed entropy with its first and second time derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    /// Smoothed entropy H̃ in `[0, 1]`.
    pub h: f64,
    /// Slope.
    pub y: f64,
    /// Curvature.
    pub z: f64,
}

/// EMA smoother feeding a 3-point backward-difference stencil.
#[derive(Debug, Clone)]
pub struct DerivativeEngine {
    alpha: f64,
    dt: f64,
    tstar: Option<f64>,
    /// Last three smoothed values, most recent last.
    history: [f64; 3],
    seen: usize,
}

impl DerivativeEngine {
    /// Create a new engine. `dt > 0`, `alpha ∈ (0, 1]`, `tstar >= 0`.
    pub fn new(alpha: f64, dt: f64, tstar: Option<f64>) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::NonPositiveDt { dt });
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::EmaOutOfRange { ema: alpha });
        }
        if let Some(t) = tstar {
            if !(t.is_finite() && t >= 0.0) {
                return Err(ConfigError::NegativeTimeScale { tstar: t });
            }
        }
        Ok(Self {
            alpha,
            dt,
            tstar,
            history: [0.0; 3],
            seen: 0,
        })
    }

    /// Feed one raw entropy value and return `(H̃, Y, Z)`.
    pub fn advance(&mut self, raw: f64) -> Derivatives {
        let smoothed = match self.previous() {
            None => raw,
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
        }
        .clamp(0.0, 1.0);

        self.history.rotate_left(1);
        self.history[2] = smoothed;
        self.seen = self.seen.saturating_add(1);

        let [h2, h1, h0] = self.history;
        let y = if self.seen >= 2 {
            (h0 - h1) / self.dt * self.slope_scale()
        } else {
            0.0
        };
        let z = if self.seen >= 3 {
            (h0 - 2.0 * h1 + h2) / (self.dt * self.dt) * self.curvature_scale()
        } else {
            0.0
        };

        Derivatives { h: smoothed, y, z }
    }

    /// Last smoothed value, if any.
    pub fn previous(&self) -> Option<f64> {
        if self.seen == 0 {
            None
        } else {
            Some(self.history[2])
        }
    }

    /// Number of smoothed values produced (saturating).
    pub fn ticks(&self) -> usize {
        self.seen
    }

    /// Forget all history; the next value seeds the smoother again.
    pub fn reset(&mut self) {
        self.history = [0.0; 3];
        self.seen = 0;
    }

    fn slope_scale(&self) -> f64 {
        self.tstar.unwrap_or(1.0)
    }

    fn curvature_scale(&self) -> f64 {
        let t = self.tstar.unwrap_or(1.0);
        t * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_construction_preconditions() {
        assert!(DerivativeEngine::new(0.2, 0.0, None).is_err());
        assert!(DerivativeEngine::new(0.0, 1.0, None).is_err());
        assert!(DerivativeEngine::new(1.1, 1.0, None).is_err());
        assert!(DerivativeEngine::new(0.5, 1.0, Some(-2.0)).is_err());
        assert!(DerivativeEngine::new(1.0, 0.05, Some(0.0)).is_ok());
    }

    #[test]
    fn test_first_tick_seeds_without_smoothing() {
        let mut eng = DerivativeEngine::new(0.2, 1.0, None).unwrap();
        let d = eng.advance(0.8);
        assert_eq!(d, Derivatives { h: 0.8, y: 0.0, z: 0.0 });
    }

    #[test]
    fn test_slope_and_curvature_warmup() {
        let mut eng = DerivativeEngine::new(1.0, 0.5, None).unwrap();
        let d1 = eng.advance(0.2);
        let d2 = eng.advance(0.6);
        let d3 = eng.advance(0.7);

        assert_eq!(d1.y, 0.0);
        assert_eq!(d1.z, 0.0);
        assert_relative_eq!(d2.y, 0.8, epsilon = 1e-12);
        assert_eq!(d2.z, 0.0);
        assert_relative_eq!(d3.y, 0.2, epsilon = 1e-12);
        // (0.7 - 1.2 + 0.2) / 0.25
        assert_relative_eq!(d3.z, -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_ema_blend() {
        let mut eng = DerivativeEngine::new(0.25, 1.0, None).unwrap();
        eng.advance(0.0);
        let d = eng.advance(1.0);
        assert_relative_eq!(d.h, 0.25);
        let d = eng.advance(1.0);
        assert_relative_eq!(d.h, 0.4375);
    }

    #[test]
    fn test_time_scale() {
        let mut plain = DerivativeEngine::new(1.0, 1.0, None).unwrap();
        let mut scaled = DerivativeEngine::new(1.0, 1.0, Some(3.0)).unwrap();
        let mut last = (None, None);
        for h in [0.1, 0.5, 0.2] {
            last = (Some(plain.advance(h)), Some(scaled.advance(h)));
        }
        let (p, s) = (last.0.unwrap(), last.1.unwrap());
        assert_relative_eq!(s.y, 3.0 * p.y, epsilon = 1e-12);
        assert_relative_eq!(s.z, 9.0 * p.z, epsilon = 1e-12);
        assert_eq!(s.h, p.h);
    }

    #[test]
    fn test_constant_input_has_zero_derivatives() {
        let mut eng = DerivativeEngine::new(0.5, 0.1, Some(30.0)).unwrap();
        for _ in 0..10 {
            let d = eng.advance(0.5);
            assert_eq!(d.h, 0.5);
            assert_eq!(d.y, 0.0);
            assert_eq!(d.z, 0.0);
        }
    }

    #[test]
    fn test_reset() {
        let mut eng = DerivativeEngine::new(0.5, 1.0, None).unwrap();
        eng.advance(0.9);
        eng.advance(0.1);
        eng.reset();
        assert!(eng.previous().is_none());
        let d = eng.advance(0.3);
        assert_eq!(d.h, 0.3);
        assert_eq!(d.y, 0.0);
    }
}
