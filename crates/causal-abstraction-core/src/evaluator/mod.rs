//! Evaluators: orchestration of enumeration, inference queries, tensor
//! composition, and scoring.
//!
//! - [`AbstractionErrorEvaluator`]: does intervening-then-abstracting commute
//!   with abstracting-then-intervening, and by how much does it fail to.
//! - [`InfoLossEvaluator`]: distance between the low-level joint and the
//!   high-level joint pulled back through an inverse abstraction.
//! - [`EffectiveInformationEvaluator`]: how abstraction shifts the effective
//!   information of mechanisms, pair by pair.
//!
//! All evaluators are stateless across calls: admissible pairs and mechanism
//! matrices are recomputed per call and discarded, never cached.

mod abstraction_error;
mod effective_info;
mod info_loss;

pub use abstraction_error::AbstractionErrorEvaluator;
pub use effective_info::EffectiveInformationEvaluator;
pub use info_loss::{InfoLossEvaluator, JointInversion};

use nalgebra::DMatrix;

use crate::abstraction::Abstraction;
use crate::enumeration::{LegitimateSets, SetEnumeration};
use crate::error::AbstractionResult;
use crate::metrics::distance::DistanceMetric;
use crate::tensor::tensorize_list;
use crate::types::InterventionSetPair;

/// Optional overrides shared by the evaluator entry points.
///
/// Every field defaults to the spec'd behavior: Jensen–Shannon distance in
/// the configured base, and the [`LegitimateSets`] enumeration strategy. An
/// explicit `pairs` list takes precedence over any strategy.
#[derive(Default)]
pub struct EvaluationOptions<'a> {
    /// Distance metric between matching columns of the two diagram paths.
    pub metric: Option<&'a dyn DistanceMetric>,
    /// Explicit J-set, bypassing enumeration.
    pub pairs: Option<&'a [InterventionSetPair]>,
    /// Enumeration strategy used when `pairs` is not given.
    pub strategy: Option<&'a dyn SetEnumeration>,
}

impl<'a> EvaluationOptions<'a> {
    /// Options selecting all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the distance metric.
    pub fn with_metric(mut self, metric: &'a dyn DistanceMetric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Supply an explicit J-set.
    pub fn with_pairs(mut self, pairs: &'a [InterventionSetPair]) -> Self {
        self.pairs = Some(pairs);
        self
    }

    /// Override the enumeration strategy.
    pub fn with_strategy(mut self, strategy: &'a dyn SetEnumeration) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// Resolve the J-set from options: explicit pairs, or the chosen strategy,
/// or the default [`LegitimateSets`] enumeration.
pub(crate) fn resolve_pairs<A: Abstraction + ?Sized>(
    abstraction: &A,
    opts: &EvaluationOptions<'_>,
) -> AbstractionResult<Vec<InterventionSetPair>> {
    if let Some(pairs) = opts.pairs {
        return Ok(pairs.to_vec());
    }
    let strategy: &dyn SetEnumeration = opts.strategy.unwrap_or(&LegitimateSets);
    strategy.enumerate(
        abstraction.low_graph(),
        abstraction.high_graph(),
        abstraction.abstraction_map(),
    )
}

/// Tensor composition of the alpha matrices for a set of high-level nodes,
/// in the given node order.
///
/// The order must be the same one used to build the corresponding low-level
/// preimage, or the composite indices of the two will disagree.
pub(crate) fn composed_alpha<A: Abstraction + ?Sized>(
    abstraction: &A,
    nodes: &[String],
) -> AbstractionResult<DMatrix<f64>> {
    let alphas = nodes
        .iter()
        .map(|n| abstraction.alpha(n).cloned())
        .collect::<AbstractionResult<Vec<_>>>()?;
    tensorize_list(&alphas)
}
