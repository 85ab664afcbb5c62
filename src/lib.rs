//! Lottolab - lottery draw analysis experiments
//!
//! This library provides:
//! - CSV/Excel draw-table reading and canonical-schema normalization
//! - Lottery-safety validation (declared type vs. data structure)
//! - Lagged one-hot feature construction
//! - A three-model prediction experiment with probabilistic and hit-rate metrics
//!
//! # Example
//!
//! ```no_run
//! use lottolab::data::{normalize_any, read_table};
//! use lottolab::experiment::run_experiment;
//! use std::path::Path;
//!
//! let df = read_table(Path::new("draws.csv")).unwrap();
//! let records = normalize_any(&df, "viking", "raw").unwrap();
//! for result in run_experiment(&records, "viking", 1).unwrap() {
//!     println!("{}: logloss {:.4}", result.model, result.logloss);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod models;
pub mod storage;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod handlers;

// Re-export commonly used types
pub use classifier::{default_classifiers, Classifier};
pub use data::{normalize_any, read_table, DrawRecord, LaggedDraw};
pub use error::AppError;
pub use experiment::run_experiment;
pub use models::{ExperimentResult, Lottery};
pub use storage::Storage;
