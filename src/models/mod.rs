//! Capability traits at the seam between selection and model fitting.
//!
//! The selection strategies never depend on a concrete model family; they
//! only require:
//!
//! - a fitting capability: observations + state count -> model or failure
//! - a scoring capability on the model: observations -> log-likelihood or
//!   failure
//!
//! Both are object-safe so tests can drive the strategies with scripted
//! stub engines.

use crate::domain::Observations;
use crate::error::{FitError, ScoreError};

/// Options for a single fit attempt.
///
/// This is deliberately explicit and scoped: a fit that exhausts
/// `max_iters` without converging is a best-effort success (recorded on the
/// model), not a warning and not an error. There is no process-global
/// warning state.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Hard cap on fitting iterations.
    pub max_iters: usize,
    /// Stop once the per-iteration log-likelihood gain drops below this.
    pub tolerance: f64,
    /// Seed for parameter initialization. The same seed and inputs must
    /// produce the same model.
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            tolerance: 1e-2,
            seed: 14,
        }
    }
}

/// A fitted generative sequence model.
pub trait SequenceModel: std::fmt::Debug + Send + Sync {
    /// Total log-likelihood of the observation set under this model.
    fn score(&self, obs: &Observations) -> Result<f64, ScoreError>;

    /// Hidden-state count the model was fitted with.
    fn n_states(&self) -> usize;

    /// Number of training sequences the model was fitted on.
    fn n_train_sequences(&self) -> usize;
}

/// A model-fitting engine.
pub trait FitEngine: Send + Sync {
    /// Attempt to fit a model with `num_states` hidden states.
    ///
    /// Must be deterministic given the same options and observations.
    fn fit(
        &self,
        obs: &Observations,
        num_states: usize,
        opts: &FitOptions,
    ) -> Result<Box<dyn SequenceModel>, FitError>;
}
