//! The selection contract shared by every strategy.

use serde::{Deserialize, Serialize};

use crate::domain::{CandidateScore, Observations, SequenceSet, SkippedCandidate};
use crate::error::{FitError, SelectionError};
use crate::models::{FitEngine, FitOptions, SequenceModel};

/// Which scoring rule drives the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Always fit the one configured state count (baseline/fallback).
    Constant { num_states: usize },
    /// Minimize `-2·logL + p·ln(N)` (fit quality vs. parameter count).
    Bic,
    /// Maximize own-item likelihood minus mean rival-item likelihood.
    Dic,
    /// Maximize mean held-out log-likelihood across folds.
    Cv,
}

/// Per-item selection configuration.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub strategy: Strategy,
    /// Smallest candidate state count (inclusive).
    pub min_states: usize,
    /// Largest candidate state count (inclusive).
    pub max_states: usize,
    /// Seed handed to the engine for every fit attempt.
    pub seed: u64,
    /// Emit per-candidate progress on stderr.
    pub verbose: bool,
    /// Fitting iteration budget per candidate.
    pub max_iters: usize,
    /// Fitting convergence tolerance.
    pub tolerance: f64,
}

impl SelectorConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            min_states: 2,
            max_states: 10,
            seed: 14,
            verbose: false,
            max_iters: 1000,
            tolerance: 1e-2,
        }
    }
}

/// The single fitted model chosen by a strategy, plus diagnostics.
#[derive(Debug)]
pub struct SelectionOutcome {
    pub model: Box<dyn SequenceModel>,
    /// State count of the returned model.
    pub num_states: usize,
    /// Criterion values for every surviving candidate, in candidate order.
    pub scores: Vec<CandidateScore>,
    /// Candidates dropped from comparison, and why.
    pub skipped: Vec<SkippedCandidate>,
}

/// One vocabulary item's selection context: training data, rival pool,
/// engine handle, and configuration.
///
/// Construct one per item; `select()` is its sole operation. The held data
/// is never mutated during selection, so repeated `select()` calls on
/// identical inputs return identical results.
pub struct Selector<'a> {
    pub(crate) data: &'a SequenceSet,
    /// Pooled observations of every other vocabulary item (DIC only).
    pub(crate) rivals: &'a [Observations],
    pub(crate) engine: &'a dyn FitEngine,
    pub(crate) config: SelectorConfig,
}

impl<'a> Selector<'a> {
    pub fn new(
        data: &'a SequenceSet,
        rivals: &'a [Observations],
        engine: &'a dyn FitEngine,
        config: SelectorConfig,
    ) -> Self {
        Self {
            data,
            rivals,
            engine,
            config,
        }
    }

    /// Run the configured strategy and return the chosen model.
    ///
    /// Per-candidate fit/score failures are absorbed (the candidate is
    /// dropped); only total failure propagates.
    pub fn select(&self) -> Result<SelectionOutcome, SelectionError> {
        if self.config.min_states > self.config.max_states {
            return Err(SelectionError::EmptyStateRange {
                min_states: self.config.min_states,
                max_states: self.config.max_states,
            });
        }

        match self.config.strategy {
            Strategy::Constant { num_states } => crate::select::constant::select(self, num_states),
            Strategy::Bic => crate::select::bic::select(self),
            Strategy::Dic => crate::select::dic::select(self),
            Strategy::Cv => crate::select::cv::select(self),
        }
    }

    /// Candidate state counts, in ascending order.
    pub(crate) fn candidate_range(&self) -> std::ops::RangeInclusive<usize> {
        self.config.min_states..=self.config.max_states
    }

    /// One fit attempt via the engine, with the configured budget and seed.
    pub(crate) fn fit_candidate(
        &self,
        obs: &Observations,
        num_states: usize,
    ) -> Result<Box<dyn SequenceModel>, FitError> {
        let opts = FitOptions {
            max_iters: self.config.max_iters,
            tolerance: self.config.tolerance,
            seed: self.config.seed,
        };
        match self.engine.fit(obs, num_states, &opts) {
            Ok(model) => {
                if self.config.verbose {
                    eprintln!(
                        "{}: fitted model with {num_states} states",
                        self.data.item()
                    );
                }
                Ok(model)
            }
            Err(err) => {
                if self.config.verbose {
                    eprintln!(
                        "{}: fit failed with {num_states} states: {err}",
                        self.data.item()
                    );
                }
                Err(err)
            }
        }
    }

    pub(crate) fn no_viable(&self, detail: impl Into<String>) -> SelectionError {
        SelectionError::NoViableCandidate {
            item: self.data.item().to_string(),
            detail: detail.into(),
        }
    }
}

/// A surviving candidate awaiting comparison.
pub(crate) struct ScoredCandidate {
    pub num_states: usize,
    pub score: f64,
    pub model: Box<dyn SequenceModel>,
}

/// Pick the best surviving candidate.
///
/// Candidates arrive in ascending state-count order and only a strictly
/// better score replaces the incumbent, so ties resolve toward the smaller
/// count.
pub(crate) fn pick_best(
    mut results: Vec<ScoredCandidate>,
    lower_is_better: bool,
) -> Option<ScoredCandidate> {
    let mut best_idx: Option<usize> = None;
    for (i, c) in results.iter().enumerate() {
        let better = match best_idx {
            None => true,
            Some(b) => {
                if lower_is_better {
                    c.score < results[b].score
                } else {
                    c.score > results[b].score
                }
            }
        };
        if better {
            best_idx = Some(i);
        }
    }
    let idx = best_idx?;
    Some(results.swap_remove(idx))
}

/// Assemble the outcome for a comparison-based strategy, or fail if no
/// candidate survived.
pub(crate) fn finish(
    sel: &Selector,
    results: Vec<ScoredCandidate>,
    skipped: Vec<SkippedCandidate>,
    lower_is_better: bool,
) -> Result<SelectionOutcome, SelectionError> {
    let scores: Vec<CandidateScore> = results
        .iter()
        .map(|c| CandidateScore {
            num_states: c.num_states,
            score: c.score,
        })
        .collect();

    let Some(best) = pick_best(results, lower_is_better) else {
        return Err(sel.no_viable(format!(
            "every candidate in {}..={} failed to fit or score",
            sel.config.min_states, sel.config.max_states
        )));
    };

    Ok(SelectionOutcome {
        model: best.model,
        num_states: best.num_states,
        scores,
        skipped,
    })
}
