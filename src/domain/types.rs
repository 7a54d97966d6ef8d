//! Shared domain types.
//!
//! Observation data is carried in two equivalent representations:
//!
//! - a list of individual sequences (`Vec<Sequence>`), which fold splitting
//!   indexes into
//! - a flattened frame matrix plus per-sequence lengths (`Observations`),
//!   which fitting consumes as concatenated frames with length markers
//!
//! `SequenceSet` owns both and guarantees they stay consistent:
//! concatenating the sequences in order reproduces the flattened form.

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// One observation sequence: `frames × features`.
///
/// Every frame has the same width (the feature dimensionality).
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub frames: Vec<Vec<f64>>,
}

impl Sequence {
    pub fn new(frames: Vec<Vec<f64>>) -> Self {
        Self { frames }
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Feature width of this sequence (0 if empty).
    pub fn n_features(&self) -> usize {
        self.frames.first().map(|f| f.len()).unwrap_or(0)
    }
}

/// Flattened multi-sequence observations: concatenated frames plus a
/// parallel list of per-sequence frame counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    frames: Vec<Vec<f64>>,
    lengths: Vec<usize>,
}

impl Observations {
    /// Build from pre-flattened parts, validating internal consistency:
    /// lengths sum to the frame count, no zero-length sequence, and every
    /// frame has the same nonzero width.
    pub fn new(frames: Vec<Vec<f64>>, lengths: Vec<usize>) -> Result<Self, SelectionError> {
        let total: usize = lengths.iter().sum();
        if total != frames.len() {
            return Err(SelectionError::InvalidData(format!(
                "Sequence lengths sum to {total} but {} frames were provided.",
                frames.len()
            )));
        }
        if lengths.iter().any(|&len| len == 0) {
            return Err(SelectionError::InvalidData(
                "Zero-length sequence in observation set.".to_string(),
            ));
        }
        if let Some(first) = frames.first() {
            if first.is_empty() {
                return Err(SelectionError::InvalidData(
                    "Observation frames must have at least one feature.".to_string(),
                ));
            }
            if frames.iter().any(|f| f.len() != first.len()) {
                return Err(SelectionError::InvalidData(
                    "Ragged observation frames: all frames must have the same width.".to_string(),
                ));
            }
        }
        Ok(Self { frames, lengths })
    }

    /// Flatten a list of sequences in order.
    pub fn from_sequences(sequences: &[Sequence]) -> Result<Self, SelectionError> {
        let mut frames = Vec::with_capacity(sequences.iter().map(Sequence::n_frames).sum());
        let mut lengths = Vec::with_capacity(sequences.len());
        for seq in sequences {
            frames.extend(seq.frames.iter().cloned());
            lengths.push(seq.n_frames());
        }
        Self::new(frames, lengths)
    }

    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_sequences(&self) -> usize {
        self.lengths.len()
    }

    /// Feature width (0 if the set is empty).
    pub fn n_features(&self) -> usize {
        self.frames.first().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate per-sequence frame slices, in order.
    pub fn sequence_slices(&self) -> impl Iterator<Item = &[Vec<f64>]> {
        let mut start = 0;
        self.lengths.iter().map(move |&len| {
            let slice = &self.frames[start..start + len];
            start += len;
            slice
        })
    }
}

/// All training data for one vocabulary item, in both representations.
///
/// The flattened form is validated against the sequence list at
/// construction and never mutated afterwards; fold handling derives fresh
/// `Observations` values via [`SequenceSet::combine`] instead of swapping
/// buffers in place.
#[derive(Debug, Clone)]
pub struct SequenceSet {
    item: String,
    sequences: Vec<Sequence>,
    flat: Observations,
}

impl SequenceSet {
    /// Build from both representations, rejecting any inconsistency between
    /// them.
    pub fn new(
        item: impl Into<String>,
        sequences: Vec<Sequence>,
        flat: Observations,
    ) -> Result<Self, SelectionError> {
        let item = item.into();
        let rebuilt = Observations::from_sequences(&sequences)?;
        if rebuilt != flat {
            return Err(SelectionError::InvalidData(format!(
                "Flattened observations for item '{item}' do not match its sequence list."
            )));
        }
        Ok(Self {
            item,
            sequences,
            flat,
        })
    }

    /// Build from the sequence list alone, deriving the flattened form.
    pub fn from_sequences(
        item: impl Into<String>,
        sequences: Vec<Sequence>,
    ) -> Result<Self, SelectionError> {
        let flat = Observations::from_sequences(&sequences)?;
        Ok(Self {
            item: item.into(),
            sequences,
            flat,
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn n_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// The full-item flattened representation.
    pub fn combined(&self) -> &Observations {
        &self.flat
    }

    /// Flatten the subset of sequences selected by `indices`, in the given
    /// order. Used to build per-fold train/test observation sets.
    pub fn combine(&self, indices: &[usize]) -> Result<Observations, SelectionError> {
        let mut subset = Vec::with_capacity(indices.len());
        for &idx in indices {
            let seq = self.sequences.get(idx).ok_or_else(|| {
                SelectionError::InvalidData(format!(
                    "Sequence index {idx} out of range for item '{}' ({} sequences).",
                    self.item,
                    self.sequences.len()
                ))
            })?;
            subset.push(seq.clone());
        }
        Observations::from_sequences(&subset)
    }
}

/// A criterion value for one surviving candidate state count.
///
/// Whether higher or lower is better depends on the strategy that produced
/// it (BIC minimizes, DIC and CV maximize).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub num_states: usize,
    pub score: f64,
}

/// A candidate state count dropped from comparison, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub num_states: usize,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[&[f64]]) -> Sequence {
        Sequence::new(values.iter().map(|f| f.to_vec()).collect())
    }

    #[test]
    fn flatten_preserves_order_and_lengths() {
        let sequences = vec![
            seq(&[&[1.0, 2.0], &[3.0, 4.0]]),
            seq(&[&[5.0, 6.0]]),
        ];
        let flat = Observations::from_sequences(&sequences).unwrap();

        assert_eq!(flat.n_frames(), 3);
        assert_eq!(flat.lengths(), &[2, 1]);
        assert_eq!(flat.n_features(), 2);
        assert_eq!(flat.frames()[2], vec![5.0, 6.0]);
    }

    #[test]
    fn observations_reject_length_mismatch() {
        let frames = vec![vec![1.0], vec![2.0]];
        let err = Observations::new(frames, vec![3]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidData(_)));
    }

    #[test]
    fn observations_reject_ragged_frames() {
        let frames = vec![vec![1.0, 2.0], vec![3.0]];
        let err = Observations::new(frames, vec![2]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidData(_)));
    }

    #[test]
    fn observations_reject_zero_length_sequence() {
        let frames = vec![vec![1.0]];
        let err = Observations::new(frames, vec![1, 0]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidData(_)));
    }

    #[test]
    fn sequence_set_rejects_inconsistent_flat_form() {
        let sequences = vec![seq(&[&[1.0], &[2.0]])];
        // Same frames, wrong segmentation.
        let flat = Observations::new(vec![vec![1.0], vec![2.0]], vec![1, 1]).unwrap();
        let err = SequenceSet::new("word", sequences, flat).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidData(_)));
    }

    #[test]
    fn combine_builds_subset_in_index_order() {
        let set = SequenceSet::from_sequences(
            "word",
            vec![
                seq(&[&[1.0]]),
                seq(&[&[2.0], &[3.0]]),
                seq(&[&[4.0]]),
            ],
        )
        .unwrap();

        let subset = set.combine(&[2, 0]).unwrap();
        assert_eq!(subset.lengths(), &[1, 1]);
        assert_eq!(subset.frames()[0], vec![4.0]);
        assert_eq!(subset.frames()[1], vec![1.0]);

        let err = set.combine(&[3]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidData(_)));
    }

    #[test]
    fn sequence_slices_roundtrip() {
        let set = SequenceSet::from_sequences(
            "word",
            vec![seq(&[&[1.0], &[2.0]]), seq(&[&[3.0]])],
        )
        .unwrap();

        let slices: Vec<&[Vec<f64>]> = set.combined().sequence_slices().collect();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].len(), 2);
        assert_eq!(slices[1][0], vec![3.0]);
    }
}
