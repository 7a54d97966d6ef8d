//! Domain types used throughout the selection pipeline.
//!
//! This module defines:
//!
//! - observation containers (`Sequence`, `Observations`, `SequenceSet`)
//! - per-candidate score records (`CandidateScore`, `SkippedCandidate`)

pub mod types;

pub use types::*;
