//! Vocabulary-level selection pipeline.
//!
//! Distinct vocabulary items are fully independent, so they run in
//! parallel: each item gets its own selector instance and (for DIC) its own
//! rival pool, and no mutable state crosses item boundaries. Per-item
//! failures land in that item's entry; they never abort the run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{CandidateScore, Observations, SequenceSet, SkippedCandidate};
use crate::error::SelectionError;
use crate::models::FitEngine;
use crate::select::{SelectionOutcome, Selector, SelectorConfig, Strategy};

/// An ordered vocabulary with unique item names.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    items: Vec<SequenceSet>,
}

impl Vocabulary {
    pub fn new(items: Vec<SequenceSet>) -> Result<Self, SelectionError> {
        for (i, a) in items.iter().enumerate() {
            if items[..i].iter().any(|b| b.item() == a.item()) {
                return Err(SelectionError::InvalidData(format!(
                    "Duplicate vocabulary item '{}'.",
                    a.item()
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[SequenceSet] {
        &self.items
    }

    pub fn get(&self, item: &str) -> Option<&SequenceSet> {
        self.items.iter().find(|s| s.item() == item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One item's result within a vocabulary run.
#[derive(Debug)]
pub struct ItemSelection {
    pub item: String,
    pub outcome: Result<SelectionOutcome, SelectionError>,
}

impl ItemSelection {
    /// Flatten into a serializable report row.
    pub fn report(&self, strategy: Strategy) -> SelectionReport {
        match &self.outcome {
            Ok(outcome) => SelectionReport {
                item: self.item.clone(),
                strategy,
                chosen_states: Some(outcome.num_states),
                scores: outcome.scores.clone(),
                skipped: outcome.skipped.clone(),
                error: None,
            },
            Err(err) => SelectionReport {
                item: self.item.clone(),
                strategy,
                chosen_states: None,
                scores: Vec::new(),
                skipped: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }
}

/// Serializable summary of one item's selection run (for JSON/CSV export by
/// surrounding tooling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub item: String,
    pub strategy: Strategy,
    pub chosen_states: Option<usize>,
    pub scores: Vec<CandidateScore>,
    pub skipped: Vec<SkippedCandidate>,
    pub error: Option<String>,
}

/// Run selection for every item in the vocabulary, in parallel.
pub fn run_selection(
    vocab: &Vocabulary,
    engine: &dyn FitEngine,
    config: &SelectorConfig,
) -> Vec<ItemSelection> {
    vocab
        .items
        .par_iter()
        .map(|set| {
            // Only DIC contrasts against the rest of the vocabulary; skip
            // the pooling for the other strategies.
            let rivals: Vec<Observations> = if matches!(config.strategy, Strategy::Dic) {
                vocab
                    .items
                    .iter()
                    .filter(|other| other.item() != set.item())
                    .map(|other| other.combined().clone())
                    .collect()
            } else {
                Vec::new()
            };

            let selector = Selector::new(set, &rivals, engine, config.clone());
            ItemSelection {
                item: set.item().to_string(),
                outcome: selector.select(),
            }
        })
        .collect()
}
