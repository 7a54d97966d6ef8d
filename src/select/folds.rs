//! Deterministic k-fold splitting over sequence indices.
//!
//! No shuffling: folds are contiguous index blocks, so a given
//! (sequence count, fold count) pair always produces the same partition.

use crate::error::SelectionError;

/// One train/test partition of sequence indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition `0..n_items` into `n_folds` train/test folds.
///
/// The first `n_items % n_folds` folds receive one extra test index; every
/// index appears exactly once as a test index across the returned folds.
/// Requires `2 <= n_folds <= n_items`; anything else is degenerate and is
/// rejected before any splitting.
pub fn kfold(n_items: usize, n_folds: usize) -> Result<Vec<Fold>, SelectionError> {
    if n_folds < 2 || n_folds > n_items {
        return Err(SelectionError::DegenerateCrossValidation {
            n_sequences: n_items,
            n_folds,
        });
    }

    let base = n_items / n_folds;
    let extra = n_items % n_folds;

    let mut folds = Vec::with_capacity(n_folds);
    let mut start = 0;
    for f in 0..n_folds {
        let size = base + usize::from(f < extra);
        let test: Vec<usize> = (start..start + size).collect();
        let train: Vec<usize> = (0..start).chain(start + size..n_items).collect();
        folds.push(Fold { train, test });
        start += size;
    }
    Ok(folds)
}
