//! Bayesian Information Criterion strategy.
//!
//! For each candidate state count `k`:
//!
//! ```text
//! BIC(k) = -2 · logL(full data) + p(k) · ln(N)
//! ```
//!
//! where `N` is the total frame count and `p(k)` the free-parameter count
//! of the model family. Lower is better: the likelihood term rewards fit,
//! the penalty term grows with model size.

use crate::domain::SkippedCandidate;
use crate::error::SelectionError;
use crate::select::selector::{ScoredCandidate, SelectionOutcome, Selector, finish};

/// Free parameters of a diagonal-covariance Gaussian HMM with `k` states
/// over `f` features: `k·(k−1)` transition probabilities, `k−1` start
/// probabilities, `k·f` means, and `k·f` variances, for `k² + 2·f·k − 1`
/// in total.
pub fn param_count(k: usize, f: usize) -> f64 {
    let k = k as f64;
    let f = f as f64;
    k * k + 2.0 * f * k - 1.0
}

pub(crate) fn select(sel: &Selector) -> Result<SelectionOutcome, SelectionError> {
    let obs = sel.data.combined();
    let log_n = (obs.n_frames() as f64).ln();
    let n_features = obs.n_features();

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for k in sel.candidate_range() {
        let model = match sel.fit_candidate(obs, k) {
            Ok(model) => model,
            Err(err) => {
                skipped.push(SkippedCandidate {
                    num_states: k,
                    reason: format!("fit failed: {err}"),
                });
                continue;
            }
        };

        let log_l = match model.score(obs) {
            Ok(v) => v,
            Err(err) => {
                skipped.push(SkippedCandidate {
                    num_states: k,
                    reason: format!("score failed: {err}"),
                });
                continue;
            }
        };

        let score = -2.0 * log_l + param_count(k, n_features) * log_n;
        if !score.is_finite() {
            skipped.push(SkippedCandidate {
                num_states: k,
                reason: "non-finite criterion value".to_string(),
            });
            continue;
        }

        if sel.config.verbose {
            eprintln!("{}: {k} states, BIC {score:.3}", sel.data.item());
        }
        results.push(ScoredCandidate {
            num_states: k,
            score,
            model,
        });
    }

    finish(sel, results, skipped, true)
}
