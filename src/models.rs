use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Supported lottery games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lottery {
    /// Viking Lotto: 6 main numbers from 1..48, 1 bonus from 1..5
    Viking,
    /// Eurojackpot: 5 main numbers from 1..50, 2 bonuses from 1..12
    Euro,
}

impl Lottery {
    /// Parse a caller-declared lottery string
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw {
            "viking" => Ok(Lottery::Viking),
            "euro" => Ok(Lottery::Euro),
            other => Err(AppError::UnknownLotteryType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lottery::Viking => "viking",
            Lottery::Euro => "euro",
        }
    }

    /// Width of the main-number range (size of the one-hot vector)
    pub fn max_num(&self) -> usize {
        match self {
            Lottery::Viking => 48,
            Lottery::Euro => 50,
        }
    }

    /// Count of main numbers drawn per draw
    pub fn k_main(&self) -> usize {
        match self {
            Lottery::Viking => 6,
            Lottery::Euro => 5,
        }
    }
}

impl std::fmt::Display for Lottery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experiment run request
///
/// Mirrors the analysis form: `dataset` is a server-readable file path
/// (upload storage is handled upstream), `window` arrives as text and is
/// validated before any file processing.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunRequest {
    pub dataset: String,
    #[serde(default = "default_lottery")]
    pub lottery: String,
    #[serde(default = "default_file_format")]
    pub file_format: String,
    #[serde(default = "default_window")]
    pub window: String,
}

fn default_lottery() -> String {
    "viking".to_string()
}

fn default_file_format() -> String {
    "raw".to_string()
}

fn default_window() -> String {
    "1".to_string()
}

/// One evaluated classifier's metrics and partition info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub model: String,
    pub logloss: f64,
    pub brier: f64,
    pub hit_k_main: f64,
    pub hit_10: f64,
    pub k_main: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_date_from: NaiveDate,
    pub train_date_to: NaiveDate,
    pub test_date_from: NaiveDate,
    pub test_date_to: NaiveDate,
    pub window: u32,
}

/// Experiment run response
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub lottery: String,
    pub results: Vec<ExperimentResult>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
