// Entropy Engine - Streaming entropy core
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Normalized Shannon entropy over histogram counts.
//!
//! `H = -Σ pᵢ·ln(pᵢ) / ln(B)` over non-empty bins, with `pᵢ = cᵢ / N`.
//! Evaluated as `(ln N - Σ cᵢ·ln cᵢ / N) / ln B`, which is the same quantity
//! but exact for the two corner cases that matter most: a single occupied bin
//! gives 0 and one sample per bin over all `B` bins gives 1.

/// Normalized entropy in `[0, 1]` for the given bin counts.
///
/// Returns 0 when there is no mass or fewer than two bins.
pub fn normalized_entropy(counts: &[usize]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }

    let mut total = 0usize;
    let mut occupied = 0usize;
    let mut sum_c_ln_c = 0.0;
    for &c in counts {
        if c > 0 {
            total += c;
            occupied += 1;
            let cf = c as f64;
            sum_c_ln_c += cf * cf.ln();
        }
    }

    if occupied <= 1 {
        return 0.0;
    }

    let n = total as f64;
    let h = n.ln() - sum_c_ln_c / n;
    let h_max = (counts.len() as f64).ln();
    (h / h_max).clamp(0.0, 1.0)
}
