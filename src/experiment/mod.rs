//! Experiment engine: lagged-feature evaluation of the bundled classifiers

pub mod metrics;
pub mod runner;

pub use metrics::{brier_score, clip_probabilities, hit_at_k, log_loss};
pub use runner::run_experiment;
