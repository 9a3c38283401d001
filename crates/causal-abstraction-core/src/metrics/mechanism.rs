//! Metrics on a single causal mechanism.
//!
//! A mechanism is a column-stochastic matrix `M` (rows = output states,
//! columns = intervention configurations). All metrics here assume a maximum
//! entropy (uniform) distribution over inputs and, where relevant, outputs.
//!
//! # Mathematical background
//!
//! - Effective information `EI(M)` averages, over a uniform choice of
//!   intervention, the KL divergence between the column and the output
//!   marginal induced by intervening uniformly. Range `[0, log_b(#outputs)]`.
//! - `determinism` measures how far columns are from uniform noise,
//!   `degeneracy` how far the uniform-intervention output marginal is from
//!   uniform. Both are normalized by `log_b(#outputs)` into `[0, 1]`.
//! - `effectiveness = determinism - degeneracy`, in `[-1, 1]`, and
//!   `ei_effect_size = effectiveness * log_b(#outputs)` restores the
//!   absolute scale.

use nalgebra::DMatrix;

use super::distance::kl_divergence;

/// Output marginal under a uniform (maximum entropy) input distribution.
///
/// Row means of `m`: applying `m` to the uniform input vector.
fn maxent_effects(m: &DMatrix<f64>) -> Vec<f64> {
    let cols = m.ncols() as f64;
    (0..m.nrows()).map(|i| m.row(i).sum() / cols).collect()
}

fn column(m: &DMatrix<f64>, j: usize) -> Vec<f64> {
    m.column(j).iter().copied().collect()
}

/// Effective information of a mechanism.
///
/// Returns the per-column KL divergences against the maxent output marginal
/// and their average.
pub fn effective_information(m: &DMatrix<f64>, base: f64) -> (Vec<f64>, f64) {
    let effects = maxent_effects(m);
    let kls: Vec<f64> = (0..m.ncols())
        .map(|j| kl_divergence(&column(m, j), &effects, base))
        .collect();
    let mean = kls.iter().sum::<f64>() / kls.len().max(1) as f64;
    (kls, mean)
}

/// Determinism of a mechanism, in `[0, 1]`.
///
/// Per-column KL divergence against the uniform output distribution,
/// normalized by `log_b(#outputs)` and averaged. A single-output mechanism
/// carries no information, so the metric is defined as 0 there (the
/// normalizer `log(1)` would otherwise divide by zero).
pub fn determinism(m: &DMatrix<f64>, base: f64) -> (Vec<f64>, f64) {
    let n_out = m.nrows();
    if n_out <= 1 {
        return (vec![0.0; m.ncols()], 0.0);
    }
    let uniform = vec![1.0 / n_out as f64; n_out];
    let norm = (n_out as f64).ln() / base.ln();
    let kls: Vec<f64> = (0..m.ncols())
        .map(|j| kl_divergence(&column(m, j), &uniform, base))
        .collect();
    let mean = kls.iter().map(|kl| kl / norm).sum::<f64>() / kls.len().max(1) as f64;
    (kls, mean)
}

/// Degeneracy of a mechanism, in `[0, 1]`.
///
/// KL divergence of the maxent output marginal against the uniform output
/// distribution, normalized by `log_b(#outputs)`. Returns `(raw_kl,
/// normalized)`, with the same single-output guard as [`determinism`].
pub fn degeneracy(m: &DMatrix<f64>, base: f64) -> (f64, f64) {
    let n_out = m.nrows();
    if n_out <= 1 {
        return (0.0, 0.0);
    }
    let effects = maxent_effects(m);
    let uniform = vec![1.0 / n_out as f64; n_out];
    let kl = kl_divergence(&effects, &uniform, base);
    let norm = (n_out as f64).ln() / base.ln();
    (kl, kl / norm)
}

/// Effectiveness: determinism minus degeneracy, in `[-1, 1]`.
pub fn effectiveness(m: &DMatrix<f64>, base: f64) -> f64 {
    let (_, det) = determinism(m, base);
    let (_, deg) = degeneracy(m, base);
    det - deg
}

/// Effectiveness scaled back to absolute units: `effectiveness * log_b(#outputs)`.
pub fn ei_effect_size(m: &DMatrix<f64>, base: f64) -> f64 {
    let size = (m.nrows() as f64).ln() / base.ln();
    effectiveness(m, base) * size
}
