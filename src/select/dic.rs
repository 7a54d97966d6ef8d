//! Discriminative Information Criterion strategy.
//!
//! For each candidate state count `k`, the model is fitted on the item's
//! own data and contrasted against every other vocabulary item:
//!
//! ```text
//! DIC(k) = logL(own item) − mean( logL(rival item) for every rival )
//! ```
//!
//! Higher is better: a good model explains its own item well and every
//! rival poorly.
//!
//! Failure policy is asymmetric, deliberately: a rival that cannot be
//! scored is silently dropped from the mean, while an own-item score
//! failure drops the whole candidate. Harmonizing the two would change
//! selection outcomes.

use crate::domain::SkippedCandidate;
use crate::error::SelectionError;
use crate::math::mean;
use crate::select::selector::{ScoredCandidate, SelectionOutcome, Selector, finish};

pub(crate) fn select(sel: &Selector) -> Result<SelectionOutcome, SelectionError> {
    let own = sel.data.combined();

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for k in sel.candidate_range() {
        let model = match sel.fit_candidate(own, k) {
            Ok(model) => model,
            Err(err) => {
                skipped.push(SkippedCandidate {
                    num_states: k,
                    reason: format!("fit failed: {err}"),
                });
                continue;
            }
        };

        let evidence = match model.score(own) {
            Ok(v) => v,
            Err(err) => {
                skipped.push(SkippedCandidate {
                    num_states: k,
                    reason: format!("own-item score failed: {err}"),
                });
                continue;
            }
        };

        let anti_evidence: Vec<f64> = sel
            .rivals
            .iter()
            .filter_map(|rival| model.score(rival).ok())
            .collect();
        let Some(anti) = mean(&anti_evidence) else {
            // No usable rival score: the contrast is undefined, so the
            // candidate is excluded rather than scored on evidence alone.
            skipped.push(SkippedCandidate {
                num_states: k,
                reason: "no rival item could be scored".to_string(),
            });
            continue;
        };

        let score = evidence - anti;
        if !score.is_finite() {
            skipped.push(SkippedCandidate {
                num_states: k,
                reason: "non-finite criterion value".to_string(),
            });
            continue;
        }

        if sel.config.verbose {
            eprintln!(
                "{}: {k} states, DIC {score:.3} ({} of {} rivals scored)",
                sel.data.item(),
                anti_evidence.len(),
                sel.rivals.len()
            );
        }
        results.push(ScoredCandidate {
            num_states: k,
            score,
            model,
        });
    }

    finish(sel, results, skipped, false)
}
