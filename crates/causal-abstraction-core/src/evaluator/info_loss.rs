//! Information loss of an abstraction at the joint-distribution level.
//!
//! The high-level joint is pulled back to the low level through an inverse of
//! the full joint abstraction and compared against the true low-level joint.
//! No canonical inverse exists (many low-level joints map to the same
//! high-level joint), so the inversion algorithm is pluggable.

use nalgebra::DMatrix;
use tracing::debug;

use crate::abstraction::Abstraction;
use crate::config::EvaluationConfig;
use crate::error::{AbstractionError, AbstractionResult};
use crate::metrics::distance::{DistanceMetric, JensenShannonDistance};
use crate::tensor::{invert_max_entropy, invert_pinv};

use super::composed_alpha;

/// How to invert the full joint abstraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JointInversion {
    /// Transpose and column-normalize: always a valid stochastic matrix when
    /// it exists, spreading inverse mass uniformly over preimages.
    #[default]
    MaxEntropy,
    /// Moore–Penrose pseudo-inverse: the algebraic least-squares inverse, not
    /// guaranteed to yield a probability vector.
    PseudoInverse,
}

/// Evaluates the information lost by viewing the system at the high level.
pub struct InfoLossEvaluator<'m, A: Abstraction> {
    abstraction: &'m A,
    config: EvaluationConfig,
}

impl<'m, A: Abstraction> InfoLossEvaluator<'m, A> {
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

    /// Distance between the low-level joint and the pulled-back high-level
    /// joint, under the chosen inversion algorithm.
    ///
    /// The metric defaults to Jensen–Shannon distance in the configured base.
    pub fn evaluate_info_loss(
        &self,
        metric: Option<&dyn DistanceMetric>,
        inversion: JointInversion,
    ) -> AbstractionResult<f64> {
        let default_metric = JensenShannonDistance::with_base(self.config.log_base);
        let metric = metric.unwrap_or(&default_metric);

        let (joint_low, joint_high) = self.abstraction.joint_distributions()?;

        // Full joint abstraction: alphas over every high-level variable in
        // declaration order, matching the ordering contract of
        // `Abstraction::joint_distributions`.
        let high_nodes = self.abstraction.high_graph().node_names().to_vec();
        let full_alpha = composed_alpha(self.abstraction, &high_nodes)?;

        if full_alpha.shape() != (joint_high.len(), joint_low.len()) {
            return Err(AbstractionError::ShapeMismatch {
                context: "full joint abstraction vs joint distributions",
                expected_rows: joint_high.len(),
                expected_cols: joint_low.len(),
                actual_rows: full_alpha.nrows(),
                actual_cols: full_alpha.ncols(),
            });
        }

        let inverse: DMatrix<f64> = match inversion {
            JointInversion::MaxEntropy => invert_max_entropy(&full_alpha)?,
            JointInversion::PseudoInverse => invert_pinv(&full_alpha)?,
        };
        let pulled_back = &inverse * &joint_high;

        let loss = metric.distance(joint_low.as_slice(), pulled_back.as_slice());
        debug!(?inversion, loss, "info loss evaluated");
        Ok(loss)
    }
}
