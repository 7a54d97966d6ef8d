//! Fitted Gaussian HMM parameters and log-space scoring.

use nalgebra::{DMatrix, DVector};

use crate::domain::Observations;
use crate::error::ScoreError;
use crate::hmm::gaussian::diag_gaussian_log_pdf;
use crate::math::{log_sum_exp, log_sum_exp_slice};
use crate::models::SequenceModel;

/// A fitted diagonal-covariance Gaussian HMM.
///
/// Parameters are stored in probability space; scoring and training take
/// logs once per pass and run the recursions entirely in log space.
#[derive(Debug, Clone)]
pub struct GaussianHmm {
    /// Initial state distribution.
    pub(crate) start: DVector<f64>,
    /// Row-stochastic transition matrix.
    pub(crate) trans: DMatrix<f64>,
    /// Per-state emission means.
    pub(crate) means: Vec<DVector<f64>>,
    /// Per-state diagonal emission variances (floored, strictly positive).
    pub(crate) vars: Vec<DVector<f64>>,
    /// Whether fitting stopped on the tolerance rather than the budget.
    pub(crate) converged: bool,
    /// Training-data log-likelihood at the last evaluated iteration.
    pub(crate) train_log_likelihood: f64,
    /// Number of sequences in the training set.
    pub(crate) n_train_sequences: usize,
}

impl GaussianHmm {
    pub fn n_states(&self) -> usize {
        self.start.len()
    }

    pub fn n_features(&self) -> usize {
        self.means.first().map(|m| m.len()).unwrap_or(0)
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn train_log_likelihood(&self) -> f64 {
        self.train_log_likelihood
    }

    /// Emission log-density of one frame under one state.
    pub(crate) fn emission_log(&self, state: usize, frame: &[f64]) -> f64 {
        diag_gaussian_log_pdf(
            frame,
            self.means[state].as_slice(),
            self.vars[state].as_slice(),
        )
    }

    /// Forward-algorithm log-likelihood of a single sequence.
    ///
    /// Rolling recursion: only the previous alpha row is kept.
    fn sequence_log_likelihood(
        &self,
        frames: &[Vec<f64>],
        start_log: &DVector<f64>,
        trans_log: &DMatrix<f64>,
    ) -> f64 {
        let n = self.n_states();
        let mut alpha: Vec<f64> = (0..n)
            .map(|j| start_log[j] + self.emission_log(j, &frames[0]))
            .collect();

        for frame in &frames[1..] {
            let mut next = vec![f64::NEG_INFINITY; n];
            for j in 0..n {
                let mut acc = f64::NEG_INFINITY;
                for i in 0..n {
                    acc = log_sum_exp(acc, alpha[i] + trans_log[(i, j)]);
                }
                next[j] = acc + self.emission_log(j, frame);
            }
            alpha = next;
        }

        log_sum_exp_slice(&alpha)
    }

    /// Total log-likelihood of the observation set (sum over sequences).
    pub fn log_likelihood(&self, obs: &Observations) -> Result<f64, ScoreError> {
        if obs.is_empty() {
            return Err(ScoreError::new("Cannot score an empty observation set."));
        }
        if obs.n_features() != self.n_features() {
            return Err(ScoreError::new(format!(
                "Feature width mismatch: model expects {}, observations have {}.",
                self.n_features(),
                obs.n_features()
            )));
        }

        let start_log = self.start.map(f64::ln);
        let trans_log = self.trans.map(f64::ln);

        let mut total = 0.0;
        for frames in obs.sequence_slices() {
            total += self.sequence_log_likelihood(frames, &start_log, &trans_log);
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(ScoreError::new(
                "Non-finite log-likelihood (degenerate distribution).",
            ))
        }
    }
}

impl SequenceModel for GaussianHmm {
    fn score(&self, obs: &Observations) -> Result<f64, ScoreError> {
        self.log_likelihood(obs)
    }

    fn n_states(&self) -> usize {
        self.n_states()
    }

    fn n_train_sequences(&self) -> usize {
        self.n_train_sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observations, Sequence};
    use crate::hmm::gaussian::diag_gaussian_log_pdf;

    fn single_state_model(mean: f64, var: f64) -> GaussianHmm {
        GaussianHmm {
            start: DVector::from_element(1, 1.0),
            trans: DMatrix::from_element(1, 1, 1.0),
            means: vec![DVector::from_element(1, mean)],
            vars: vec![DVector::from_element(1, var)],
            converged: true,
            train_log_likelihood: 0.0,
            n_train_sequences: 1,
        }
    }

    fn obs_1d(values: &[&[f64]]) -> Observations {
        let sequences: Vec<Sequence> = values
            .iter()
            .map(|seq| Sequence::new(seq.iter().map(|&v| vec![v]).collect()))
            .collect();
        Observations::from_sequences(&sequences).unwrap()
    }

    #[test]
    fn single_state_likelihood_is_sum_of_densities() {
        // With one state, the forward recursion degenerates to a plain sum
        // of emission log-densities.
        let model = single_state_model(0.0, 1.0);
        let obs = obs_1d(&[&[0.5, -0.5], &[1.0]]);

        let expected: f64 = [0.5, -0.5, 1.0]
            .iter()
            .map(|&v| diag_gaussian_log_pdf(&[v], &[0.0], &[1.0]))
            .sum();
        let got = model.log_likelihood(&obs).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn two_state_likelihood_prefers_matching_data() {
        let model = GaussianHmm {
            start: DVector::from_vec(vec![0.5, 0.5]),
            trans: DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.1, 0.9]),
            means: vec![DVector::from_element(1, 0.0), DVector::from_element(1, 10.0)],
            vars: vec![DVector::from_element(1, 1.0), DVector::from_element(1, 1.0)],
            converged: true,
            train_log_likelihood: 0.0,
            n_train_sequences: 2,
        };

        let near = obs_1d(&[&[0.1, 9.8, 10.1]]);
        let far = obs_1d(&[&[5.0, 5.0, 5.0]]);
        let ll_near = model.log_likelihood(&near).unwrap();
        let ll_far = model.log_likelihood(&far).unwrap();
        assert!(ll_near > ll_far);
    }

    #[test]
    fn score_rejects_feature_width_mismatch() {
        let model = single_state_model(0.0, 1.0);
        let sequences = vec![Sequence::new(vec![vec![1.0, 2.0]])];
        let obs = Observations::from_sequences(&sequences).unwrap();
        assert!(model.log_likelihood(&obs).is_err());
    }

    #[test]
    fn score_rejects_empty_observations() {
        let model = single_state_model(0.0, 1.0);
        let obs = Observations::new(Vec::new(), Vec::new()).unwrap();
        assert!(model.log_likelihood(&obs).is_err());
    }
}
