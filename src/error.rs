//! Application error types
//!
//! Every pipeline stage fails fast with one of these kinds; errors propagate
//! unchanged to the caller boundary, where they are rendered as a JSON
//! [`ErrorResponse`](crate::models::ErrorResponse).

use thiserror::Error;

#[cfg(feature = "api")]
use crate::models::ErrorResponse;
#[cfg(feature = "api")]
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// File extension not recognized by the table reader
    #[error("Unsupported file format: {0}. Use CSV or XLSX")]
    UnsupportedFormat(String),
    /// Declared file format's required columns are absent
    #[error("{0} format selected, but required columns are missing")]
    MissingColumns(String),
    /// Declared file_format outside the fixed variant set
    #[error("Unknown file_format parameter: {0}")]
    UnknownFormat(String),
    /// Declared lottery outside the fixed variant set
    #[error("Unknown lottery type: {0}")]
    UnknownLotteryType(String),
    /// Data's detected structural signature contradicts the declared lottery
    #[error("File looks like {detected}, but '{declared}' was selected")]
    LotteryMismatch { declared: String, detected: String },
    /// A number exceeds the declared lottery's valid range
    #[error("{0}")]
    RangeViolation(String),
    /// Fewer than the minimum lagged rows available for a train/test split
    #[error("Not enough data after lagging: {rows} rows, need at least {min}")]
    InsufficientData { rows: usize, min: usize },
    /// Window parameter not a positive integer
    #[error("Window parameter must be a positive integer, got '{0}'")]
    InvalidWindow(String),
    /// Underlying table read/parse failure (I/O, CSV, spreadsheet, dates)
    #[error("Failed to read table: {0}")]
    Table(String),
    /// Output persistence failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat(_) => "unsupported_format",
            AppError::MissingColumns(_) => "missing_columns",
            AppError::UnknownFormat(_) => "unknown_format",
            AppError::UnknownLotteryType(_) => "unknown_lottery_type",
            AppError::LotteryMismatch { .. } => "lottery_mismatch",
            AppError::RangeViolation(_) => "range_violation",
            AppError::InsufficientData { .. } => "insufficient_data",
            AppError::InvalidWindow(_) => "invalid_window",
            AppError::Table(_) => "table_error",
            AppError::Io(_) => "io_error",
        }
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::Table(err.to_string())
    }
}

#[cfg(feature = "api")]
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Persistence failures are server-side; everything else is a
            // request-scoped input error
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        })
    }
}

/// Validate the window parameter as supplied by the caller.
///
/// Runs before any file processing so a bad window never touches the dataset.
pub fn validate_window(raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(w) if w > 0 => Ok(w as u32),
        _ => Err(AppError::InvalidWindow(raw.to_string())),
    }
}
