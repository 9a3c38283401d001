//! Evaluation configuration.
//!
//! Settings shared by the evaluators: the logarithm base used by
//! information-theoretic metrics, the exactness tolerances, and whether
//! per-pair work is distributed over the rayon thread pool.

use serde::{Deserialize, Serialize};

use crate::error::{AbstractionError, AbstractionResult};

/// Configuration for abstraction evaluation.
///
/// # Example
///
/// ```
/// use causal_abstraction_core::config::EvaluationConfig;
///
/// let config = EvaluationConfig::default();
/// assert_eq!(config.log_base, 2.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Logarithm base for divergences and effective-information metrics.
    pub log_base: f64,

    /// Relative tolerance for the exactness check.
    pub rtol: f64,

    /// Absolute tolerance for the exactness check.
    pub atol: f64,

    /// Evaluate admissible pairs in parallel across the rayon pool.
    ///
    /// Safe because per-pair work is independent and the max/sum reductions
    /// are order-independent.
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            log_base: 2.0,
            rtol: 1e-5,
            atol: 1e-8,
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logarithm base.
    pub fn with_log_base(mut self, log_base: f64) -> Self {
        self.log_base = log_base;
        self
    }

    /// Set the exactness tolerances.
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Enable or disable parallel pair evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AbstractionError::ConfigError`] if the log base is not a
    /// finite value greater than 1, or if either tolerance is negative.
    pub fn validate(&self) -> AbstractionResult<()> {
        if !self.log_base.is_finite() || self.log_base <= 1.0 {
            return Err(AbstractionError::ConfigError(format!(
                "log_base must be finite and > 1, got {}",
                self.log_base
            )));
        }
        if self.rtol < 0.0 || self.atol < 0.0 {
            return Err(AbstractionError::ConfigError(format!(
                "tolerances must be non-negative, got rtol={}, atol={}",
                self.rtol, self.atol
            )));
        }
        Ok(())
    }
}
