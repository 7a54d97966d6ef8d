//! Error types.
//!
//! Two layers:
//!
//! - `FitError` / `ScoreError`: engine-level failures. The selection
//!   strategies absorb these locally by dropping the affected candidate,
//!   fold, or rival from comparison.
//! - `SelectionError`: the failures that propagate out of `select()`.
//!   Nothing below this level ever aborts a selection run.

/// The fitting engine could not produce a valid model for a state count
/// (numerical instability, insufficient data, degenerate input).
///
/// Non-convergence within the iteration budget is *not* a `FitError`; the
/// engine returns its best-effort model and records the fact on the model.
#[derive(Debug, Clone)]
pub struct FitError {
    message: String,
}

impl FitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FitError {}

/// A fitted model could not produce a log-likelihood for an observation set
/// (feature-width mismatch, empty input, degenerate distribution).
#[derive(Debug, Clone)]
pub struct ScoreError {
    message: String,
}

impl ScoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScoreError {}

/// Failures surfaced to the caller of `select()` (or raised while building
/// the input data).
#[derive(Debug, Clone)]
pub enum SelectionError {
    /// The candidate range `[min_states, max_states]` is empty.
    EmptyStateRange { min_states: usize, max_states: usize },
    /// The fold request cannot be satisfied by the available sequences.
    /// Resolved before any splitting or fitting is attempted.
    DegenerateCrossValidation { n_sequences: usize, n_folds: usize },
    /// Every candidate state count failed to fit or score. The one failure
    /// that must propagate: no model can be returned for the item, and no
    /// default is silently substituted.
    NoViableCandidate { item: String, detail: String },
    /// Inconsistent input data (mismatched representations, ragged frames,
    /// empty sequences, duplicate item names).
    InvalidData(String),
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::EmptyStateRange {
                min_states,
                max_states,
            } => write!(
                f,
                "Empty candidate range: min_states={min_states} > max_states={max_states}."
            ),
            SelectionError::DegenerateCrossValidation {
                n_sequences,
                n_folds,
            } => write!(
                f,
                "Degenerate cross-validation: {n_folds} fold(s) requested for {n_sequences} sequence(s)."
            ),
            SelectionError::NoViableCandidate { item, detail } => {
                write!(f, "No viable model for item '{item}': {detail}")
            }
            SelectionError::InvalidData(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for SelectionError {}
