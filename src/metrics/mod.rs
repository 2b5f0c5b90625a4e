//! Metrics module - per-capita derivation

mod per_capita;

pub use per_capita::{MetricDeriver, MetricError, PER_CAPITA_SUFFIX};
