//! Error types for causal-abstraction-core.
//!
//! This module defines the central error type [`AbstractionError`] used
//! throughout the crate, along with the [`AbstractionResult<T>`] alias.
//!
//! Everything in an evaluation is deterministic, so no variant is retryable:
//! a shape mismatch or an empty preimage will recur on every attempt and is
//! surfaced immediately instead of being skipped.

use thiserror::Error;

/// Errors that can occur while evaluating a causal abstraction.
#[derive(Debug, Error)]
pub enum AbstractionError {
    /// A variable name was not found in the graph it was used against.
    #[error("Unknown variable '{name}' in {graph} graph")]
    UnknownNode {
        /// The missing variable name
        name: String,
        /// Which graph was queried ("low-level" or "high-level")
        graph: &'static str,
    },

    /// A variable was declared twice.
    #[error("Duplicate variable '{0}'")]
    DuplicateNode(String),

    /// The graph contains a directed cycle; only acyclic models are supported.
    #[error("Causal graph contains a directed cycle")]
    GraphCycle,

    /// A high-level node has no low-level preimage under the abstraction map.
    ///
    /// This is a configuration error in the abstraction map itself and is
    /// never silently skipped.
    #[error("Invalid abstraction map: high-level node '{node}' has an empty preimage")]
    EmptyPreimage {
        /// The high-level node with no preimage
        node: String,
    },

    /// `tensorize_list` was called with no matrices.
    #[error("Cannot tensorize an empty list of matrices")]
    EmptyTensorList,

    /// Two matrices or distributions that must agree in shape do not.
    #[error("Shape mismatch in {context}: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}")]
    ShapeMismatch {
        /// Where the mismatch was detected
        context: &'static str,
        /// Expected row count
        expected_rows: usize,
        /// Expected column count
        expected_cols: usize,
        /// Actual row count
        actual_rows: usize,
        /// Actual column count
        actual_cols: usize,
    },

    /// Max-entropy inversion hit a zero column sum and cannot normalize.
    #[error("Degenerate normalization: column {column} of the transposed matrix sums to zero")]
    DegenerateNormalization {
        /// Index of the offending column
        column: usize,
    },

    /// The SVD-based pseudo-inverse failed to converge.
    #[error("Pseudo-inverse failed: {0}")]
    PseudoInverse(&'static str),

    /// A vector expected to be a probability distribution is not.
    #[error("Invalid distribution in {context}: {reason}")]
    InvalidDistribution {
        /// Where the distribution was checked
        context: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A causal model failed structural validation.
    #[error("Invalid causal model: {0}")]
    InvalidModel(String),

    /// An intervention set pair violated its invariants.
    #[error("Invalid intervention set pair: {0}")]
    InvalidPair(String),

    /// Configuration validation failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result alias used throughout causal-abstraction-core.
pub type AbstractionResult<T> = Result<T, AbstractionError>;
