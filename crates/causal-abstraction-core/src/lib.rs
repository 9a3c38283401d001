//! Causal Abstraction Core Library
//!
//! Evaluates how faithfully a high-level causal model (M1) approximates a
//! low-level causal model (M0) under a declared variable abstraction: a
//! node-to-node map plus per-node stochastic projection matrices ("alphas").
//! The central question is whether intervening-then-abstracting commutes with
//! abstracting-then-intervening, and by how much it fails to.
//!
//! # Architecture
//!
//! - [`graph`]: causal DAGs and set-to-set reachability
//! - [`tensor`]: Kronecker-style composition and stochastic-matrix inversion
//! - [`metrics`]: mechanism metrics (effective information et al.) and
//!   pluggable probability distances
//! - [`enumeration`]: strategies producing the admissible J-set of
//!   (sources, targets) pairs; the default power-set strategy is O(4^n)
//! - [`abstraction`]: the collaborator trait owning models, map, and alphas
//! - [`evaluator`]: abstraction error, information loss, and effective
//!   information evaluators
//! - [`stubs`]: an exact tabular collaborator for tests and small models
//!
//! # Example
//!
//! ```
//! use causal_abstraction_core::evaluator::{AbstractionErrorEvaluator, EvaluationOptions};
//! use causal_abstraction_core::graph::build_graph;
//! use causal_abstraction_core::stubs::{TabularAbstraction, TabularCausalModel};
//! use causal_abstraction_core::types::AbstractionMap;
//! use nalgebra::DMatrix;
//! use std::collections::HashMap;
//!
//! // Identical one-variable models related by the identity abstraction.
//! let mut low = TabularCausalModel::new(
//!     build_graph("low-level", &[("a", 2)], &[]).unwrap(),
//! );
//! low.set_cpt("a", vec![], DMatrix::from_column_slice(2, 1, &[0.3, 0.7])).unwrap();
//! let mut high = TabularCausalModel::new(
//!     build_graph("high-level", &[("A", 2)], &[]).unwrap(),
//! );
//! high.set_cpt("A", vec![], DMatrix::from_column_slice(2, 1, &[0.3, 0.7])).unwrap();
//!
//! let abstraction = TabularAbstraction::new(
//!     low,
//!     high,
//!     AbstractionMap::new([("a", "A")]).unwrap(),
//!     HashMap::from([("A".to_string(), DMatrix::identity(2, 2))]),
//! ).unwrap();
//!
//! let evaluator = AbstractionErrorEvaluator::new(&abstraction);
//! let overall = evaluator
//!     .evaluate_overall_abstraction_error(&EvaluationOptions::new())
//!     .unwrap();
//! assert!(overall.abs() < 1e-9);
//! ```

pub mod abstraction;
pub mod config;
pub mod enumeration;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod metrics;
pub mod stubs;
pub mod tensor;
pub mod types;

// Re-exports for convenience
pub use abstraction::Abstraction;
pub use config::EvaluationConfig;
pub use error::{AbstractionError, AbstractionResult};
pub use evaluator::{
    AbstractionErrorEvaluator, EffectiveInformationEvaluator, EvaluationOptions,
    InfoLossEvaluator, JointInversion,
};
pub use types::{AbstractionMap, InterventionSetPair};
