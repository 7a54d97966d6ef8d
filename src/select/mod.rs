//! Hidden-state-count selection.
//!
//! Responsibilities:
//!
//! - the shared selection contract (`Selector`, `Strategy`, `SelectionOutcome`)
//! - the four scoring strategies (constant / BIC / DIC / cross-validation)
//! - deterministic fold splitting for cross-validation
//!
//! Failure policy, shared by every scoring strategy: a candidate that fails
//! to fit or score is dropped from comparison (never treated as a
//! worst-possible score); only "no candidate survived" propagates.

pub mod bic;
pub mod constant;
pub mod cv;
pub mod dic;
pub mod folds;
pub mod selector;

pub use folds::*;
pub use selector::*;

#[cfg(test)]
pub(crate) mod testutil;
