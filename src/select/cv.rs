//! Cross-validation strategy.
//!
//! For each candidate state count `k`, the item's sequences are split into
//! deterministic folds; the model is fitted on each fold's training
//! sequences and scored on the held-out ones. The candidate's criterion is
//! the mean held-out log-likelihood over the folds that survived (a fold
//! whose fit or score fails is excluded, never zero-substituted).
//!
//! The folds only pick the count: the returned model is refit on the
//! complete item data as an explicit final step. Train/test observation
//! sets are built as fresh values per fold; the selector's stored data is
//! never touched.

use crate::domain::{CandidateScore, SkippedCandidate};
use crate::error::SelectionError;
use crate::math::mean;
use crate::select::folds::kfold;
use crate::select::selector::{SelectionOutcome, Selector};

/// Upper bound on the fold count; fewer sequences clamp it down.
const MAX_FOLDS: usize = 3;

pub(crate) fn select(sel: &Selector) -> Result<SelectionOutcome, SelectionError> {
    let n_sequences = sel.data.n_sequences();

    // Held-out scoring needs at least one training and one held-out
    // sequence, so fewer than 2 sequences is degenerate. Resolved here,
    // before any splitting or fitting is attempted.
    if n_sequences < 2 {
        return Err(SelectionError::DegenerateCrossValidation {
            n_sequences,
            n_folds: MAX_FOLDS.min(n_sequences),
        });
    }
    let folds = kfold(n_sequences, MAX_FOLDS.min(n_sequences))?;

    let mut ranked: Vec<CandidateScore> = Vec::new();
    let mut skipped: Vec<SkippedCandidate> = Vec::new();

    for k in sel.candidate_range() {
        let mut fold_scores = Vec::with_capacity(folds.len());
        for (fold_idx, fold) in folds.iter().enumerate() {
            let train = sel.data.combine(&fold.train)?;
            let held_out = sel.data.combine(&fold.test)?;

            let Ok(model) = sel.fit_candidate(&train, k) else {
                continue;
            };
            match model.score(&held_out) {
                Ok(score) if score.is_finite() => {
                    if sel.config.verbose {
                        eprintln!(
                            "{}: {k} states, fold {fold_idx}: held-out logL {score:.3}",
                            sel.data.item()
                        );
                    }
                    fold_scores.push(score);
                }
                _ => {}
            }
        }

        let Some(avg) = mean(&fold_scores) else {
            skipped.push(SkippedCandidate {
                num_states: k,
                reason: "no fold produced a usable score".to_string(),
            });
            continue;
        };
        if sel.config.verbose {
            eprintln!(
                "{}: {k} states, mean held-out logL {avg:.3} over {} fold(s)",
                sel.data.item(),
                fold_scores.len()
            );
        }
        ranked.push(CandidateScore {
            num_states: k,
            score: avg,
        });
    }

    if ranked.is_empty() {
        return Err(sel.no_viable(format!(
            "every candidate in {}..={} failed to fit or score",
            sel.config.min_states, sel.config.max_states
        )));
    }

    // Candidate-order score table for the outcome, before ranking.
    let scores = ranked.clone();

    // Refit on the full item data, best mean first. Stable sort keeps
    // ascending state-count order among equal means, so ties resolve toward
    // the smaller count. If the best count fails to refit, the next
    // surviving candidate is tried; the folds never produce the returned
    // model.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for candidate in ranked {
        match sel.fit_candidate(sel.data.combined(), candidate.num_states) {
            Ok(model) => {
                return Ok(SelectionOutcome {
                    model,
                    num_states: candidate.num_states,
                    scores,
                    skipped,
                });
            }
            Err(err) => skipped.push(SkippedCandidate {
                num_states: candidate.num_states,
                reason: format!("full-data refit failed: {err}"),
            }),
        }
    }

    Err(sel.no_viable("no surviving candidate could be refit on the full data"))
}
