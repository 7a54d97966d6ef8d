//! Baum–Welch (EM) fitting for diagonal-covariance Gaussian HMMs.
//!
//! Each iteration runs a log-space forward/backward pass per sequence,
//! pools the expected-count accumulators across sequences, then re-estimates
//! start/transition/emission parameters. Fitting stops when the
//! log-likelihood gain drops below the tolerance or the iteration budget is
//! exhausted; running out of budget is a best-effort success, recorded on
//! the model, never an error.
//!
//! Initialization is fully seeded: the same seed and observations produce
//! the same model.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::Observations;
use crate::error::FitError;
use crate::hmm::model::GaussianHmm;
use crate::math::{log_sum_exp, log_sum_exp_slice};
use crate::models::{FitEngine, FitOptions, SequenceModel};

/// Floor applied to diagonal variances so emission densities stay proper.
const VAR_FLOOR: f64 = 1e-3;

/// Smallest expected-count mass for which a parameter update is applied;
/// below this the previous value is kept (state effectively unvisited).
const MIN_OCCUPANCY: f64 = 1e-12;

/// The bundled fitting engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianHmmEngine;

impl FitEngine for GaussianHmmEngine {
    fn fit(
        &self,
        obs: &Observations,
        num_states: usize,
        opts: &FitOptions,
    ) -> Result<Box<dyn SequenceModel>, FitError> {
        Ok(Box::new(fit_gaussian_hmm(obs, num_states, opts)?))
    }
}

/// Fit a Gaussian HMM with `num_states` hidden states.
pub fn fit_gaussian_hmm(
    obs: &Observations,
    num_states: usize,
    opts: &FitOptions,
) -> Result<GaussianHmm, FitError> {
    if num_states == 0 {
        return Err(FitError::new("State count must be > 0."));
    }
    if opts.max_iters == 0 {
        return Err(FitError::new("Iteration budget must be > 0."));
    }
    if obs.is_empty() {
        return Err(FitError::new("No observations to fit."));
    }
    if obs.n_frames() < num_states {
        return Err(FitError::new(format!(
            "Insufficient data: {} frame(s) for {} states.",
            obs.n_frames(),
            num_states
        )));
    }
    if obs.frames().iter().flatten().any(|v| !v.is_finite()) {
        return Err(FitError::new("Non-finite value in observations."));
    }

    let mut model = init_model(obs, num_states, opts.seed);
    let mut prev_ll = f64::NEG_INFINITY;

    for _ in 0..opts.max_iters {
        let stats = accumulate_stats(&model, obs)?;
        model.train_log_likelihood = stats.log_likelihood;

        if prev_ll.is_finite() && (stats.log_likelihood - prev_ll).abs() < opts.tolerance {
            model.converged = true;
            break;
        }
        prev_ll = stats.log_likelihood;
        apply_update(&mut model, &stats);
    }

    Ok(model)
}

/// Seeded initial parameters.
///
/// - uniform start distribution
/// - diagonally dominant transition rows with seeded jitter
/// - means via farthest-point selection over data frames (seeded first pick)
/// - variances set to the global per-feature variance, floored
fn init_model(obs: &Observations, num_states: usize, seed: u64) -> GaussianHmm {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = num_states;

    let start = DVector::from_element(n, 1.0 / n as f64);

    let mut trans = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            trans[(i, j)] = if i == j {
                0.8 + 0.15 * rng.r#gen::<f64>()
            } else {
                0.01 + 0.1 * rng.r#gen::<f64>()
            };
        }
        let row_sum: f64 = trans.row(i).sum();
        for j in 0..n {
            trans[(i, j)] /= row_sum;
        }
    }

    let means: Vec<DVector<f64>> = farthest_point_means(obs, n, &mut rng)
        .into_iter()
        .map(|idx| DVector::from_column_slice(&obs.frames()[idx]))
        .collect();

    let global = DVector::from_vec(global_variance(obs));
    let vars = vec![global; n];

    GaussianHmm {
        start,
        trans,
        means,
        vars,
        converged: false,
        train_log_likelihood: f64::NEG_INFINITY,
        n_train_sequences: obs.n_sequences(),
    }
}

/// Indices of `n` data frames to use as initial means: a seeded random
/// first pick, then greedily the frame farthest from the means chosen so
/// far. Spreads the initial emissions across the data regardless of how
/// the frames are ordered.
fn farthest_point_means(obs: &Observations, n: usize, rng: &mut StdRng) -> Vec<usize> {
    let frames = obs.frames();
    let first = rng.gen_range(0..frames.len());
    let mut chosen = vec![first];
    let mut min_dist: Vec<f64> = frames.iter().map(|f| sq_dist(f, &frames[first])).collect();

    while chosen.len() < n {
        let mut next = 0;
        for (i, &d) in min_dist.iter().enumerate() {
            if d > min_dist[next] {
                next = i;
            }
        }
        chosen.push(next);
        for (i, f) in frames.iter().enumerate() {
            let d = sq_dist(f, &frames[next]);
            if d < min_dist[i] {
                min_dist[i] = d;
            }
        }
    }
    chosen
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn global_variance(obs: &Observations) -> Vec<f64> {
    let f = obs.n_features();
    let n = obs.n_frames() as f64;

    let mut mean = vec![0.0; f];
    for frame in obs.frames() {
        for (acc, v) in mean.iter_mut().zip(frame) {
            *acc += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = vec![0.0; f];
    for frame in obs.frames() {
        for (acc, (v, m)) in var.iter_mut().zip(frame.iter().zip(&mean)) {
            let d = v - m;
            *acc += d * d;
        }
    }
    for v in &mut var {
        *v = (*v / n).max(VAR_FLOOR);
    }
    var
}

/// Pooled expected counts from one E-step over all sequences.
struct EStats {
    log_likelihood: f64,
    /// Expected count of starting in each state.
    start_acc: DVector<f64>,
    /// Expected transition counts.
    trans_num: DMatrix<f64>,
    /// Total state occupancy over all frames.
    occupancy: DVector<f64>,
    /// Occupancy-weighted sums of frames, per state.
    mean_num: Vec<DVector<f64>>,
    /// Occupancy-weighted sums of squared frames, per state.
    sq_num: Vec<DVector<f64>>,
}

fn accumulate_stats(model: &GaussianHmm, obs: &Observations) -> Result<EStats, FitError> {
    let n = model.n_states();
    let f = model.n_features();
    let start_log = model.start.map(f64::ln);
    let trans_log = model.trans.map(f64::ln);

    let mut stats = EStats {
        log_likelihood: 0.0,
        start_acc: DVector::zeros(n),
        trans_num: DMatrix::zeros(n, n),
        occupancy: DVector::zeros(n),
        mean_num: vec![DVector::zeros(f); n],
        sq_num: vec![DVector::zeros(f); n],
    };

    for frames in obs.sequence_slices() {
        let t_len = frames.len();
        let log_b: Vec<Vec<f64>> = frames
            .iter()
            .map(|frame| (0..n).map(|j| model.emission_log(j, frame)).collect())
            .collect();

        let alpha = forward(&start_log, &trans_log, &log_b);
        let seq_ll = log_sum_exp_slice(&alpha[t_len - 1]);
        if !seq_ll.is_finite() {
            return Err(FitError::new(
                "Non-finite sequence likelihood during fitting.",
            ));
        }
        let beta = backward(&trans_log, &log_b);

        for t in 0..t_len {
            for j in 0..n {
                let gamma = (alpha[t][j] + beta[t][j] - seq_ll).exp();
                if t == 0 {
                    stats.start_acc[j] += gamma;
                }
                stats.occupancy[j] += gamma;
                for (k, &x) in frames[t].iter().enumerate() {
                    stats.mean_num[j][k] += gamma * x;
                    stats.sq_num[j][k] += gamma * x * x;
                }
            }
        }
        for t in 0..t_len.saturating_sub(1) {
            for i in 0..n {
                for j in 0..n {
                    let xi = (alpha[t][i]
                        + trans_log[(i, j)]
                        + log_b[t + 1][j]
                        + beta[t + 1][j]
                        - seq_ll)
                        .exp();
                    stats.trans_num[(i, j)] += xi;
                }
            }
        }

        stats.log_likelihood += seq_ll;
    }

    Ok(stats)
}

fn forward(
    start_log: &DVector<f64>,
    trans_log: &DMatrix<f64>,
    log_b: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let n = start_log.len();
    let t_len = log_b.len();
    let mut alpha = vec![vec![f64::NEG_INFINITY; n]; t_len];

    for j in 0..n {
        alpha[0][j] = start_log[j] + log_b[0][j];
    }
    for t in 1..t_len {
        for j in 0..n {
            let mut acc = f64::NEG_INFINITY;
            for i in 0..n {
                acc = log_sum_exp(acc, alpha[t - 1][i] + trans_log[(i, j)]);
            }
            alpha[t][j] = acc + log_b[t][j];
        }
    }
    alpha
}

fn backward(trans_log: &DMatrix<f64>, log_b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = trans_log.nrows();
    let t_len = log_b.len();
    // β_{T-1} = ln 1 = 0
    let mut beta = vec![vec![0.0; n]; t_len];

    for t in (0..t_len.saturating_sub(1)).rev() {
        for i in 0..n {
            let mut acc = f64::NEG_INFINITY;
            for j in 0..n {
                acc = log_sum_exp(acc, trans_log[(i, j)] + log_b[t + 1][j] + beta[t + 1][j]);
            }
            beta[t][i] = acc;
        }
    }
    beta
}

fn apply_update(model: &mut GaussianHmm, stats: &EStats) {
    let n = model.n_states();
    let f = model.n_features();

    let start_total: f64 = stats.start_acc.sum();
    if start_total > MIN_OCCUPANCY {
        for j in 0..n {
            model.start[j] = stats.start_acc[j] / start_total;
        }
    }

    for i in 0..n {
        let row_sum: f64 = stats.trans_num.row(i).sum();
        if row_sum > MIN_OCCUPANCY {
            for j in 0..n {
                model.trans[(i, j)] = stats.trans_num[(i, j)] / row_sum;
            }
        }
    }

    for j in 0..n {
        let occ = stats.occupancy[j];
        if occ <= MIN_OCCUPANCY {
            continue;
        }
        for k in 0..f {
            let mean = stats.mean_num[j][k] / occ;
            let var = (stats.sq_num[j][k] / occ - mean * mean).max(VAR_FLOOR);
            model.means[j][k] = mean;
            model.vars[j][k] = var;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sequence;

    /// Two well-separated 1-D clusters: half the frames near 0, half near 10.
    fn bimodal_obs(n_sequences: usize) -> Observations {
        let offsets = [-0.1, 0.0, 0.1];
        let sequences: Vec<Sequence> = (0..n_sequences)
            .map(|s| {
                let mut frames = Vec::new();
                for (i, &o) in offsets.iter().enumerate() {
                    frames.push(vec![o + 0.01 * (s + i) as f64]);
                }
                for (i, &o) in offsets.iter().enumerate() {
                    frames.push(vec![10.0 + o + 0.01 * (s + i) as f64]);
                }
                Sequence::new(frames)
            })
            .collect();
        Observations::from_sequences(&sequences).unwrap()
    }

    #[test]
    fn fit_is_deterministic_for_a_fixed_seed() {
        let obs = bimodal_obs(3);
        let opts = FitOptions {
            max_iters: 50,
            tolerance: 1e-4,
            seed: 7,
        };

        let a = fit_gaussian_hmm(&obs, 2, &opts).unwrap();
        let b = fit_gaussian_hmm(&obs, 2, &opts).unwrap();

        let score_a = a.log_likelihood(&obs).unwrap();
        let score_b = b.log_likelihood(&obs).unwrap();
        assert_eq!(score_a, score_b);
        assert_eq!(a.train_log_likelihood(), b.train_log_likelihood());
    }

    #[test]
    fn two_states_beat_one_on_bimodal_data() {
        let obs = bimodal_obs(4);
        let opts = FitOptions {
            max_iters: 100,
            tolerance: 1e-4,
            seed: 3,
        };

        let one = fit_gaussian_hmm(&obs, 1, &opts).unwrap();
        let two = fit_gaussian_hmm(&obs, 2, &opts).unwrap();

        let ll_one = one.log_likelihood(&obs).unwrap();
        let ll_two = two.log_likelihood(&obs).unwrap();
        assert!(
            ll_two > ll_one + 1.0,
            "2-state fit should clearly beat 1-state on bimodal data: {ll_two} vs {ll_one}"
        );
    }

    #[test]
    fn fit_records_training_sequence_count() {
        let obs = bimodal_obs(5);
        let opts = FitOptions::default();
        let model = fit_gaussian_hmm(&obs, 2, &opts).unwrap();
        assert_eq!(model.n_train_sequences, 5);
    }

    #[test]
    fn fit_rejects_degenerate_requests() {
        let obs = bimodal_obs(1); // 6 frames
        let opts = FitOptions::default();

        assert!(fit_gaussian_hmm(&obs, 0, &opts).is_err());
        assert!(fit_gaussian_hmm(&obs, 7, &opts).is_err());

        let empty = Observations::new(Vec::new(), Vec::new()).unwrap();
        assert!(fit_gaussian_hmm(&empty, 2, &opts).is_err());
    }

    #[test]
    fn fit_rejects_non_finite_input() {
        let sequences = vec![Sequence::new(vec![vec![1.0], vec![f64::NAN]])];
        let obs = Observations::from_sequences(&sequences).unwrap();
        assert!(fit_gaussian_hmm(&obs, 1, &FitOptions::default()).is_err());
    }

    #[test]
    fn engine_boxes_the_same_model() {
        let obs = bimodal_obs(2);
        let opts = FitOptions {
            max_iters: 20,
            tolerance: 1e-3,
            seed: 11,
        };

        let direct = fit_gaussian_hmm(&obs, 2, &opts).unwrap();
        let boxed = GaussianHmmEngine.fit(&obs, 2, &opts).unwrap();

        assert_eq!(boxed.n_states(), 2);
        assert_eq!(
            boxed.score(&obs).unwrap(),
            direct.log_likelihood(&obs).unwrap()
        );
    }
}
