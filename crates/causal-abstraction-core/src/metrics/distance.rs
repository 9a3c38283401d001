//! Probability-distance metrics.
//!
//! # Mathematical background
//!
//! KL divergence from distribution P to Q:
//! ```text
//! D_KL(P || Q) = sum_i P(i) * log(P(i) / Q(i))
//! ```
//! with the standard convention `0 * log(0 / q) = 0` for zero-probability
//! cells; a cell with `p > 0, q = 0` yields +inf. The convention is applied
//! explicitly; naive division would turn every zero cell into NaN.
//!
//! Jensen–Shannon distance is the square root of the JS divergence
//! ```text
//! JSD(P, Q) = 0.5 * D_KL(P || M) + 0.5 * D_KL(Q || M),   M = (P + Q) / 2
//! ```
//! and is bounded by `sqrt(log_b(2))`: exactly 1 in base 2, the default here.

use crate::error::{AbstractionError, AbstractionResult};

/// A distance between two discrete probability distributions.
///
/// Implementations must be `Send + Sync`: pairs are evaluated in parallel and
/// share one metric instance.
///
/// A metric may return NaN for degenerate input (for example two all-zero
/// vectors); the evaluators replace NaN with 0 before aggregation.
pub trait DistanceMetric: Send + Sync {
    /// Distance between `p` and `q`, assumed to be same-length distributions.
    fn distance(&self, p: &[f64], q: &[f64]) -> f64;
}

/// Jensen–Shannon distance with a configurable logarithm base.
#[derive(Debug, Clone, Copy)]
pub struct JensenShannonDistance {
    /// Logarithm base; 2 bounds the distance by 1.
    pub base: f64,
}

impl Default for JensenShannonDistance {
    fn default() -> Self {
        Self { base: 2.0 }
    }
}

impl JensenShannonDistance {
    /// Jensen–Shannon distance in the given base.
    pub fn with_base(base: f64) -> Self {
        Self { base }
    }
}

impl DistanceMetric for JensenShannonDistance {
    fn distance(&self, p: &[f64], q: &[f64]) -> f64 {
        jensen_shannon_distance(p, q, self.base)
    }
}

/// Total variation distance: half the L1 distance, in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalVariationDistance;

impl DistanceMetric for TotalVariationDistance {
    fn distance(&self, p: &[f64], q: &[f64]) -> f64 {
        0.5 * p.iter().zip(q).map(|(a, b)| (a - b).abs()).sum::<f64>()
    }
}

/// KL divergence D_KL(P || Q) in the given base.
///
/// Inputs are not renormalized; callers pass distributions. Returns +inf if
/// some cell has `p > 0` but `q = 0`.
pub fn kl_divergence(p: &[f64], q: &[f64], base: f64) -> f64 {
    debug_assert_eq!(p.len(), q.len());
    let ln_base = base.ln();
    let mut kl = 0.0f64;
    for (&p_i, &q_i) in p.iter().zip(q) {
        if p_i == 0.0 {
            // 0 * log(0 / q) = 0 by convention.
            continue;
        }
        if q_i == 0.0 {
            return f64::INFINITY;
        }
        kl += p_i * (p_i / q_i).ln() / ln_base;
    }
    kl
}

/// Jensen–Shannon distance (square root of the JS divergence) in `base`.
///
/// Returns NaN when both inputs are all-zero; the caller decides how to
/// treat degenerate columns.
pub fn jensen_shannon_distance(p: &[f64], q: &[f64], base: f64) -> f64 {
    debug_assert_eq!(p.len(), q.len());
    let total: f64 = p.iter().sum::<f64>() + q.iter().sum::<f64>();
    if total == 0.0 {
        return f64::NAN;
    }
    let m: Vec<f64> = p.iter().zip(q).map(|(a, b)| 0.5 * (a + b)).collect();
    let jsd = 0.5 * kl_divergence(p, &m, base) + 0.5 * kl_divergence(q, &m, base);
    // Floating error can push an exact-zero divergence slightly negative.
    jsd.max(0.0).sqrt()
}

/// Approximate equality with relative and absolute tolerance.
///
/// `|a - b| <= atol + rtol * |b|`, the numpy `isclose` convention used by the
/// exactness check.
pub fn is_close(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// Validate that a slice is a probability distribution within tolerance.
pub fn validate_distribution(p: &[f64], context: &'static str) -> AbstractionResult<()> {
    if p.iter().any(|&x| x < 0.0 || !x.is_finite()) {
        return Err(AbstractionError::InvalidDistribution {
            context,
            reason: "contains a negative or non-finite entry".to_string(),
        });
    }
    let sum: f64 = p.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(AbstractionError::InvalidDistribution {
            context,
            reason: format!("sums to {} instead of 1", sum),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kl_identical_is_zero() {
        let p = [0.25, 0.25, 0.25, 0.25];
        assert_relative_eq!(kl_divergence(&p, &p, 2.0), 0.0);
    }

    #[test]
    fn test_kl_zero_cell_convention() {
        // p has a zero cell; the 0 * log(0/q) term must vanish, not NaN.
        let p = [0.0, 1.0];
        let q = [0.5, 0.5];
        assert_relative_eq!(kl_divergence(&p, &q, 2.0), 1.0);
    }

    #[test]
    fn test_kl_unsupported_cell_is_infinite() {
        let p = [0.5, 0.5];
        let q = [1.0, 0.0];
        assert!(kl_divergence(&p, &q, 2.0).is_infinite());
    }

    #[test]
    fn test_js_distance_bounds_base_2() {
        // Disjoint supports give the maximum distance: 1 in base 2.
        let p = [1.0, 0.0];
        let q = [0.0, 1.0];
        assert_relative_eq!(jensen_shannon_distance(&p, &q, 2.0), 1.0, epsilon = 1e-12);

        // In base e the bound is sqrt(ln 2).
        let d_e = jensen_shannon_distance(&p, &q, std::f64::consts::E);
        assert_relative_eq!(d_e, std::f64::consts::LN_2.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_js_distance_symmetric() {
        let p = [0.7, 0.2, 0.1];
        let q = [0.1, 0.3, 0.6];
        assert_relative_eq!(
            jensen_shannon_distance(&p, &q, 2.0),
            jensen_shannon_distance(&q, &p, 2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_js_distance_identical_is_zero() {
        let p = [0.3, 0.7];
        assert_relative_eq!(jensen_shannon_distance(&p, &p, 2.0), 0.0);
    }

    #[test]
    fn test_js_degenerate_all_zero_is_nan() {
        let z = [0.0, 0.0];
        assert!(jensen_shannon_distance(&z, &z, 2.0).is_nan());
    }

    #[test]
    fn test_total_variation() {
        let metric = TotalVariationDistance;
        assert_relative_eq!(metric.distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
        assert_relative_eq!(metric.distance(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_is_close_at_zero() {
        assert!(is_close(1e-9, 0.0, 1e-5, 1e-8));
        assert!(!is_close(1e-3, 0.0, 1e-5, 1e-8));
    }

    #[test]
    fn test_validate_distribution() {
        assert!(validate_distribution(&[0.5, 0.5], "test").is_ok());
        assert!(validate_distribution(&[0.5, 0.6], "test").is_err());
        assert!(validate_distribution(&[-0.1, 1.1], "test").is_err());
    }
}
