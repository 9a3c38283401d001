//! Stub implementations of the external collaborators.
//!
//! The evaluators only require the [`crate::abstraction::Abstraction`] trait;
//! inference itself is a collaborator concern. This module provides an exact
//! tabular implementation (a CPT-based model with do-interventions and
//! brute-force joint enumeration) for tests and for callers without their
//! own inference engine. It is exponential in the number of variables and
//! meant for small models only.

mod model;
mod tabular_abstraction;

pub use model::{Cpt, TabularCausalModel};
pub use tabular_abstraction::TabularAbstraction;
