//! The abstraction collaborator interface.
//!
//! Evaluators never run inference themselves; they consume an [`Abstraction`]
//! that owns both causal models, the variable map, and the per-node alpha
//! matrices, and that answers mechanism and joint-distribution queries. This
//! keeps the core decoupled from any particular inference algorithm: the
//! crate ships one exact tabular implementation in [`crate::stubs`], and
//! callers with their own engine implement this trait instead.

use nalgebra::{DMatrix, DVector};

use crate::error::AbstractionResult;
use crate::graph::CausalGraph;
use crate::types::AbstractionMap;

/// A declared abstraction between a low-level model M0 and a high-level
/// model M1.
///
/// # Index convention
///
/// Every returned matrix follows the shared mixed-radix convention: a
/// composite index over a variable list runs row-major with the first
/// variable most significant, and mechanism matrices are column-stochastic
/// with columns indexed by source configurations and rows by target
/// configurations. Alpha matrices map joint low-level preimage
/// configurations (columns) to high-level values (rows).
///
/// # Concurrency
///
/// Implementations must tolerate concurrent read-only queries (`Sync`):
/// admissible pairs are evaluated in parallel against one shared instance.
pub trait Abstraction: Send + Sync {
    /// Structure of the low-level model M0.
    fn low_graph(&self) -> &CausalGraph;

    /// Structure of the high-level model M1.
    fn high_graph(&self) -> &CausalGraph;

    /// The variable-level abstraction map.
    fn abstraction_map(&self) -> &AbstractionMap;

    /// The alpha matrix for one high-level variable: shape
    /// `(cardinality(high_node), product of preimage cardinalities)`,
    /// column-stochastic.
    fn alpha(&self, high_node: &str) -> AbstractionResult<&DMatrix<f64>>;

    /// Low-level mechanism `P(targets | do(sources))` in M0.
    fn low_mechanism(
        &self,
        sources: &[String],
        targets: &[String],
    ) -> AbstractionResult<DMatrix<f64>>;

    /// High-level mechanism `P(targets | do(sources))` in M1.
    fn high_mechanism(
        &self,
        sources: &[String],
        targets: &[String],
    ) -> AbstractionResult<DMatrix<f64>>;

    /// Full joint distributions `(M0 joint, M1 joint)`.
    ///
    /// The high-level joint is ordered by the high-level graph's declaration
    /// order; the low-level joint by the preimage of that order (see
    /// [`AbstractionMap::invert`]), so the tensor composition of all alphas
    /// applies to it directly.
    fn joint_distributions(&self) -> AbstractionResult<(DVector<f64>, DVector<f64>)>;
}
