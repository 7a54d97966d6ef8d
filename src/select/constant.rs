//! Constant-count strategy.
//!
//! Fits the one configured state count on the full item data and returns
//! it. No scoring, no comparison; the count is not derived from the
//! candidate range. A fit failure propagates; there is no retry with a
//! different count.

use crate::error::SelectionError;
use crate::select::selector::{SelectionOutcome, Selector};

pub(crate) fn select(
    sel: &Selector,
    num_states: usize,
) -> Result<SelectionOutcome, SelectionError> {
    match sel.fit_candidate(sel.data.combined(), num_states) {
        Ok(model) => Ok(SelectionOutcome {
            model,
            num_states,
            scores: Vec::new(),
            skipped: Vec::new(),
        }),
        Err(err) => Err(sel.no_viable(format!("fit failed for fixed count {num_states}: {err}"))),
    }
}
