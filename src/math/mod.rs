//! Numeric helpers: log-space arithmetic and small statistics.

pub mod logsum;
pub mod stats;

pub use logsum::*;
pub use stats::*;
