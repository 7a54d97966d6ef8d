//! `hmm-select` library crate.
//!
//! Picks the best hidden-state count for a Gaussian hidden Markov model,
//! per vocabulary item, from example observation sequences of that item.
//! "Best" is defined by one of several interchangeable scoring strategies:
//!
//! - a fixed constant (baseline/fallback)
//! - Bayesian Information Criterion (fit quality vs. parameter count)
//! - Discriminative Information Criterion (fit quality vs. rival items)
//! - cross-validated held-out log-likelihood
//!
//! The selection core is decoupled from the fitting engine behind the
//! `models` capability traits; a diagonal-covariance Gaussian HMM engine is
//! provided in `hmm`. Distinct vocabulary items are independent, so the
//! `pipeline` module runs them in parallel, one selector per item.

pub mod data;
pub mod domain;
pub mod error;
pub mod hmm;
pub mod math;
pub mod models;
pub mod pipeline;
pub mod select;
