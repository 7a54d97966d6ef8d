//! Diagonal-covariance Gaussian HMM engine.
//!
//! A complete implementation of the fitting capability consumed by the
//! selection strategies:
//!
//! - log-space forward algorithm for scoring (`model`)
//! - Baum–Welch (EM) fitting over multi-sequence input (`train`)
//!
//! The selection core only ever sees this through the `models` traits.

pub mod gaussian;
pub mod model;
pub mod train;

pub use gaussian::*;
pub use model::*;
pub use train::*;
