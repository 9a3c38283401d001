//! Commuting-diagram abstraction error.
//!
//! For an admissible pair (S, T) the two ways around the diagram are
//!
//! ```text
//! lowerpath = M1(T | do(S)) · alpha_S     (abstract the intervention, then
//!                                          apply the high-level mechanism)
//! upperpath = alpha_T · M0(T0 | do(S0))   (apply the low-level mechanism,
//!                                          then abstract the result)
//! ```
//!
//! Both are matrices over the same composite indices: columns are joint
//! low-level intervention configurations, rows are high-level target values.
//! The pair's error is the *maximum* distance between matching columns, a
//! worst-case measure over interventions rather than an average.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::abstraction::Abstraction;
use crate::config::EvaluationConfig;
use crate::error::{AbstractionError, AbstractionResult};
use crate::metrics::distance::{is_close, DistanceMetric, JensenShannonDistance};
use crate::types::InterventionSetPair;

use super::{composed_alpha, resolve_pairs, EvaluationOptions};

/// Evaluates how far an abstraction is from making the intervention diagram
/// commute.
pub struct AbstractionErrorEvaluator<'m, A: Abstraction> {
    abstraction: &'m A,
    config: EvaluationConfig,
}

impl<'m, A: Abstraction> AbstractionErrorEvaluator<'m, A> {
    /// Evaluator over the given abstraction with default configuration.
    pub fn new(abstraction: &'m A) -> Self {
        Self {
            abstraction,
            config: EvaluationConfig::default(),
        }
    }

    /// Evaluator with an explicit configuration.
    pub fn with_config(abstraction: &'m A, config: EvaluationConfig) -> Self {
        Self {
            abstraction,
            config,
        }
    }

    /// Per-pair abstraction errors over the resolved J-set, in J order.
    ///
    /// Each error is the worst-case column distance between the two diagram
    /// paths for that pair. NaN column distances (degenerate distributions)
    /// are replaced with 0 before the per-pair max, a deliberate lossy
    /// simplification that can mask true divergence in degenerate cases.
    pub fn evaluate_abstraction_errors(
        &self,
        opts: &EvaluationOptions<'_>,
    ) -> AbstractionResult<Vec<f64>> {
        let default_metric = JensenShannonDistance::with_base(self.config.log_base);
        let metric: &dyn DistanceMetric = opts.metric.unwrap_or(&default_metric);
        let pairs = resolve_pairs(self.abstraction, opts)?;
        debug!(pairs = pairs.len(), "evaluating abstraction errors");

        if self.config.parallel {
            pairs
                .par_iter()
                .map(|pair| self.evaluate_pair(pair, metric))
                .collect()
        } else {
            pairs
                .iter()
                .map(|pair| self.evaluate_pair(pair, metric))
                .collect()
        }
    }

    /// Overall abstraction error: the maximum per-pair error.
    ///
    /// An empty J-set yields 0.0; there is nothing the abstraction could
    /// fail to commute on.
    ///
    /// Because the reduction is a max, a caller-level deadline may drop
    /// pending pairs and still read the partial result as a conservative
    /// lower bound.
    pub fn evaluate_overall_abstraction_error(
        &self,
        opts: &EvaluationOptions<'_>,
    ) -> AbstractionResult<f64> {
        let errors = self.evaluate_abstraction_errors(opts)?;
        if errors.is_empty() {
            debug!("empty J-set; overall abstraction error defined as 0");
        }
        Ok(errors.into_iter().fold(0.0, f64::max))
    }

    /// Cumulative abstraction error: the sum of per-pair errors.
    ///
    /// Unlike the max reduction, a partial sum over a subset of pairs is
    /// meaningless; do not aggregate this across aborted evaluations.
    pub fn evaluate_cumulative_abstraction_errors(
        &self,
        opts: &EvaluationOptions<'_>,
    ) -> AbstractionResult<f64> {
        Ok(self.evaluate_abstraction_errors(opts)?.iter().sum())
    }

    /// Whether the abstraction is exact: overall error within the configured
    /// `(rtol, atol)` of zero.
    pub fn is_exact(&self, opts: &EvaluationOptions<'_>) -> AbstractionResult<bool> {
        let overall = self.evaluate_overall_abstraction_error(opts)?;
        Ok(is_close(0.0, overall, self.config.rtol, self.config.atol))
    }

    /// Steps 1–6 for one admissible pair.
    fn evaluate_pair(
        &self,
        pair: &InterventionSetPair,
        metric: &dyn DistanceMetric,
    ) -> AbstractionResult<f64> {
        let map = self.abstraction.abstraction_map();

        // 1. Low-level preimages, in the same node order as the pair.
        let low_sources = map.invert(pair.sources())?;
        let low_targets = map.invert(pair.targets())?;
        trace!(pair = %pair, ?low_sources, ?low_targets, "resolved preimages");

        // 2. Mechanisms at both levels.
        let m1 = self
            .abstraction
            .high_mechanism(pair.sources(), pair.targets())?;
        let m0 = self.abstraction.low_mechanism(&low_sources, &low_targets)?;

        // 3. Alpha composites in the same node order as the preimages.
        let alpha_s = composed_alpha(self.abstraction, pair.sources())?;
        let alpha_t = composed_alpha(self.abstraction, pair.targets())?;

        // 4. Shape discipline before composing; a mismatch here means the
        // index conventions diverged somewhere upstream and is fatal.
        if alpha_s.shape() != (m1.ncols(), m0.ncols()) {
            return Err(AbstractionError::ShapeMismatch {
                context: "source alpha vs mechanisms",
                expected_rows: m1.ncols(),
                expected_cols: m0.ncols(),
                actual_rows: alpha_s.nrows(),
                actual_cols: alpha_s.ncols(),
            });
        }
        if alpha_t.shape() != (m1.nrows(), m0.nrows()) {
            return Err(AbstractionError::ShapeMismatch {
                context: "target alpha vs mechanisms",
                expected_rows: m1.nrows(),
                expected_cols: m0.nrows(),
                actual_rows: alpha_t.nrows(),
                actual_cols: alpha_t.ncols(),
            });
        }

        let lowerpath = &m1 * &alpha_s;
        let upperpath = &alpha_t * &m0;

        // 5-6. Worst-case column distance, NaN zeroed.
        let mut worst = 0.0f64;
        for c in 0..lowerpath.ncols() {
            let p: Vec<f64> = lowerpath.column(c).iter().copied().collect();
            let q: Vec<f64> = upperpath.column(c).iter().copied().collect();
            let mut d = metric.distance(&p, &q);
            if d.is_nan() {
                d = 0.0;
            }
            worst = worst.max(d);
        }

        debug!(pair = %pair, error = worst, "pair evaluated");
        Ok(worst)
    }
}
