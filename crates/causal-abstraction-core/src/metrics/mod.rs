//! Information-theoretic metrics.
//!
//! - [`distance`]: pluggable probability-distance metrics used to compare
//!   matching columns of the two diagram paths.
//! - [`mechanism`]: scalar and per-column metrics on a single mechanism
//!   matrix (effective information, determinism, degeneracy, effectiveness).

pub mod distance;
pub mod mechanism;

pub use distance::{
    is_close, jensen_shannon_distance, kl_divergence, DistanceMetric, JensenShannonDistance,
    TotalVariationDistance,
};
pub use mechanism::{
    degeneracy, determinism, effective_information, effectiveness, ei_effect_size,
};
