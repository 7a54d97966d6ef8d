//! Scripted stub engines for exercising strategy failure policy.
//!
//! The stubs make the "skip failed candidates" rules directly observable:
//! every fit request is recorded, and fit/score outcomes are scripted per
//! state count.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::{Observations, Sequence, SequenceSet};
use crate::error::{FitError, ScoreError};
use crate::math::mean;
use crate::models::{FitEngine, FitOptions, SequenceModel};

/// How a stub model responds to `score`.
#[derive(Debug, Clone)]
pub(crate) enum ScoreScript {
    /// The same value for any observation set.
    Fixed(f64),
    /// `per_frame * n_frames`, which distinguishes sets by size.
    PerFrame(f64),
    /// `below` when the mean first feature is under `threshold`, `above`
    /// otherwise. Distinguishes own-item data from distant rivals.
    SplitAt {
        threshold: f64,
        below: f64,
        above: f64,
    },
    /// Fail for sets containing a frame whose first feature equals
    /// `marker`; apply `otherwise` to any other set.
    FailOnMarker {
        marker: f64,
        otherwise: Box<ScoreScript>,
    },
    /// Fail for any observation set.
    Fail,
}

impl ScoreScript {
    fn apply(&self, obs: &Observations) -> Result<f64, ScoreError> {
        match self {
            ScoreScript::Fixed(v) => Ok(*v),
            ScoreScript::PerFrame(v) => Ok(v * obs.n_frames() as f64),
            ScoreScript::SplitAt {
                threshold,
                below,
                above,
            } => {
                let firsts: Vec<f64> = obs.frames().iter().map(|f| f[0]).collect();
                let m = mean(&firsts).unwrap_or(0.0);
                Ok(if m < *threshold { *below } else { *above })
            }
            ScoreScript::FailOnMarker { marker, otherwise } => {
                if contains_marker(obs, *marker) {
                    Err(ScoreError::new("scripted score failure"))
                } else {
                    otherwise.apply(obs)
                }
            }
            ScoreScript::Fail => Err(ScoreError::new("scripted score failure")),
        }
    }
}

/// How the stub engine responds to `fit` for one state count.
#[derive(Debug, Clone)]
pub(crate) enum FitRule {
    Ok(ScoreScript),
    Fail,
    /// Fail for training sets containing the marker; fit `otherwise`-scoring
    /// models from any other set.
    FailOnMarker { marker: f64, otherwise: ScoreScript },
}

#[derive(Debug)]
pub(crate) struct StubModel {
    num_states: usize,
    n_train: usize,
    script: ScoreScript,
}

impl SequenceModel for StubModel {
    fn score(&self, obs: &Observations) -> Result<f64, ScoreError> {
        self.script.apply(obs)
    }

    fn n_states(&self) -> usize {
        self.num_states
    }

    fn n_train_sequences(&self) -> usize {
        self.n_train
    }
}

/// A zero-data stub model (for exercising comparison helpers directly).
pub(crate) fn stub_model(num_states: usize) -> StubModel {
    StubModel {
        num_states,
        n_train: 0,
        script: ScoreScript::Fixed(0.0),
    }
}

/// A record of one `fit` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FitCall {
    pub num_states: usize,
    pub n_frames: usize,
    pub n_sequences: usize,
}

/// Engine whose per-state-count behavior is scripted up front.
#[derive(Debug)]
pub(crate) struct StubEngine {
    fallback: FitRule,
    rules: BTreeMap<usize, FitRule>,
    calls: Mutex<Vec<FitCall>>,
}

impl StubEngine {
    pub fn new(fallback: FitRule) -> Self {
        Self {
            fallback,
            rules: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rule(mut self, num_states: usize, rule: FitRule) -> Self {
        self.rules.insert(num_states, rule);
        self
    }

    pub fn recorded_calls(&self) -> Vec<FitCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl FitEngine for StubEngine {
    fn fit(
        &self,
        obs: &Observations,
        num_states: usize,
        _opts: &FitOptions,
    ) -> Result<Box<dyn SequenceModel>, FitError> {
        self.calls.lock().unwrap().push(FitCall {
            num_states,
            n_frames: obs.n_frames(),
            n_sequences: obs.n_sequences(),
        });

        let rule = self.rules.get(&num_states).unwrap_or(&self.fallback);
        let script = match rule {
            FitRule::Ok(script) => script.clone(),
            FitRule::Fail => return Err(FitError::new("scripted fit failure")),
            FitRule::FailOnMarker { marker, otherwise } => {
                if contains_marker(obs, *marker) {
                    return Err(FitError::new("scripted fit failure"));
                }
                otherwise.clone()
            }
        };

        Ok(Box::new(StubModel {
            num_states,
            n_train: obs.n_sequences(),
            script,
        }))
    }
}

fn contains_marker(obs: &Observations, marker: f64) -> bool {
    obs.frames().iter().any(|f| f.first() == Some(&marker))
}

/// A small single-feature sequence set: one inner slice per sequence.
pub(crate) fn toy_set(item: &str, sequences: &[&[f64]]) -> SequenceSet {
    let seqs: Vec<Sequence> = sequences
        .iter()
        .map(|s| Sequence::new(s.iter().map(|&v| vec![v]).collect()))
        .collect();
    SequenceSet::from_sequences(item, seqs).unwrap()
}
