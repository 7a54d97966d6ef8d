//! Synthetic vocabulary generation.
//!
//! Sequences are drawn from a ground-truth state walk: the walk stays in
//! its current state with probability `dwell`, otherwise jumps uniformly to
//! one of the other states; every visited state emits its mean vector plus
//! Gaussian noise. Deterministic per seed; used by tests and examples.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Sequence, SequenceSet};
use crate::error::SelectionError;
use crate::pipeline::Vocabulary;

/// Ground-truth shape of one synthetic item.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub name: String,
    pub n_sequences: usize,
    pub frames_per_sequence: usize,
    /// Per-state emission means; all rows must share one nonzero width.
    pub state_means: Vec<Vec<f64>>,
    /// Emission noise standard deviation.
    pub noise: f64,
    /// Probability of staying in the current state per step.
    pub dwell: f64,
}

/// Generate one item's sequence set.
pub fn generate_item(spec: &ItemSpec, seed: u64) -> Result<SequenceSet, SelectionError> {
    if spec.n_sequences == 0 || spec.frames_per_sequence == 0 {
        return Err(SelectionError::InvalidData(
            "Sample shape must have at least one sequence and one frame.".to_string(),
        ));
    }
    let Some(first) = spec.state_means.first() else {
        return Err(SelectionError::InvalidData(
            "Sample needs at least one ground-truth state.".to_string(),
        ));
    };
    if first.is_empty() || spec.state_means.iter().any(|m| m.len() != first.len()) {
        return Err(SelectionError::InvalidData(
            "Ground-truth state means must share one nonzero width.".to_string(),
        ));
    }
    if !(spec.noise.is_finite() && spec.noise > 0.0) {
        return Err(SelectionError::InvalidData(
            "Sample noise must be finite and > 0.".to_string(),
        ));
    }
    if !(spec.dwell.is_finite() && spec.dwell > 0.0 && spec.dwell <= 1.0) {
        return Err(SelectionError::InvalidData(
            "Dwell probability must lie in (0, 1].".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, spec.noise)
        .map_err(|e| SelectionError::InvalidData(format!("Noise distribution error: {e}")))?;
    let n_states = spec.state_means.len();

    let mut sequences = Vec::with_capacity(spec.n_sequences);
    for _ in 0..spec.n_sequences {
        let mut state = rng.gen_range(0..n_states);
        let mut frames = Vec::with_capacity(spec.frames_per_sequence);
        for _ in 0..spec.frames_per_sequence {
            let frame: Vec<f64> = spec.state_means[state]
                .iter()
                .map(|m| m + normal.sample(&mut rng))
                .collect();
            frames.push(frame);

            if n_states > 1 && rng.r#gen::<f64>() >= spec.dwell {
                // Jump to one of the other states, uniformly.
                let jump = rng.gen_range(0..n_states - 1);
                state = if jump >= state { jump + 1 } else { jump };
            }
        }
        sequences.push(Sequence::new(frames));
    }

    SequenceSet::from_sequences(spec.name.clone(), sequences)
}

/// Generate a whole vocabulary, one seeded stream per item.
pub fn generate_vocabulary(specs: &[ItemSpec], seed: u64) -> Result<Vocabulary, SelectionError> {
    let mut items = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        items.push(generate_item(spec, seed.wrapping_add(i as u64))?);
    }
    Vocabulary::new(items)
}
