//! Run output persistence
//!
//! Each run overwrites two snapshots (latest normalized table, latest
//! results) and appends its result rows to an append-only history log. The
//! history writer is serialized behind a mutex so concurrent runs cannot
//! interleave rows.

use chrono::Local;
use polars::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use crate::data::normalize::{to_dataframe, DrawRecord};
use crate::error::AppError;
use crate::models::ExperimentResult;

pub const NORMALIZED_LATEST: &str = "normalized_latest.csv";
pub const RESULTS_LATEST: &str = "results_latest.csv";
pub const RESULTS_HISTORY: &str = "results_history.csv";

const RESULT_COLUMNS: [&str; 13] = [
    "model",
    "logloss",
    "brier",
    "hit_k_main",
    "hit_10",
    "k_main",
    "train_rows",
    "test_rows",
    "train_date_from",
    "train_date_to",
    "test_date_from",
    "test_date_to",
    "window",
];

pub struct Storage {
    outputs_dir: PathBuf,
    history_lock: Mutex<()>,
}

impl Storage {
    /// Create the output directory (once, at construction) and the handle
    /// used by every subsequent run.
    pub fn new(outputs_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let outputs_dir = outputs_dir.into();
        fs::create_dir_all(&outputs_dir)?;
        Ok(Self {
            outputs_dir,
            history_lock: Mutex::new(()),
        })
    }

    pub fn outputs_dir(&self) -> &PathBuf {
        &self.outputs_dir
    }

    /// Overwrite the latest normalized dataset snapshot.
    pub fn save_normalized(&self, records: &[DrawRecord]) -> Result<(), AppError> {
        let mut df = to_dataframe(records)?;
        let path = self.outputs_dir.join(NORMALIZED_LATEST);
        let mut file = fs::File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        info!(rows = records.len(), path = %path.display(), "saved normalized snapshot");
        Ok(())
    }

    /// Overwrite the latest results snapshot.
    pub fn save_results(&self, results: &[ExperimentResult]) -> Result<(), AppError> {
        let mut df = results_dataframe(results)?;
        let path = self.outputs_dir.join(RESULTS_LATEST);
        let mut file = fs::File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }

    /// Append this run's result rows to the history log.
    ///
    /// Rows gain a millisecond timestamp and the declared lottery/window.
    /// Append-only: the header is written only when the file is created, and
    /// existing rows are never re-read or rewritten.
    pub fn append_history(
        &self,
        results: &[ExperimentResult],
        lottery: &str,
        window: u32,
    ) -> Result<(), AppError> {
        let _guard = match self.history_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let path = self.outputs_dir.join(RESULTS_HISTORY);
        let write_header = !path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        if write_header {
            writeln!(file, "{},timestamp,lottery", RESULT_COLUMNS.join(","))?;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        for r in results {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                r.model,
                r.logloss,
                r.brier,
                r.hit_k_main,
                r.hit_10,
                r.k_main,
                r.train_rows,
                r.test_rows,
                r.train_date_from,
                r.train_date_to,
                r.test_date_from,
                r.test_date_to,
                window,
                timestamp,
                lottery,
            )?;
        }

        info!(rows = results.len(), path = %path.display(), "appended run to history");
        Ok(())
    }
}

fn results_dataframe(results: &[ExperimentResult]) -> Result<DataFrame, AppError> {
    let models: Vec<String> = results.iter().map(|r| r.model.clone()).collect();
    let columns = vec![
        Column::new("model".into(), models),
        Column::new(
            "logloss".into(),
            results.iter().map(|r| r.logloss).collect::<Vec<f64>>(),
        ),
        Column::new(
            "brier".into(),
            results.iter().map(|r| r.brier).collect::<Vec<f64>>(),
        ),
        Column::new(
            "hit_k_main".into(),
            results.iter().map(|r| r.hit_k_main).collect::<Vec<f64>>(),
        ),
        Column::new(
            "hit_10".into(),
            results.iter().map(|r| r.hit_10).collect::<Vec<f64>>(),
        ),
        Column::new(
            "k_main".into(),
            results
                .iter()
                .map(|r| r.k_main as i64)
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "train_rows".into(),
            results
                .iter()
                .map(|r| r.train_rows as i64)
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "test_rows".into(),
            results
                .iter()
                .map(|r| r.test_rows as i64)
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "train_date_from".into(),
            results
                .iter()
                .map(|r| r.train_date_from.to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "train_date_to".into(),
            results
                .iter()
                .map(|r| r.train_date_to.to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "test_date_from".into(),
            results
                .iter()
                .map(|r| r.test_date_from.to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "test_date_to".into(),
            results
                .iter()
                .map(|r| r.test_date_to.to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "window".into(),
            results
                .iter()
                .map(|r| r.window as i64)
                .collect::<Vec<i64>>(),
        ),
    ];

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_records() -> Vec<DrawRecord> {
        vec![DrawRecord {
            draw_no: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            mains: [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)],
            bonus: [Some(3), None],
        }]
    }

    fn sample_results() -> Vec<ExperimentResult> {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        vec![ExperimentResult {
            model: "logreg_sgd".to_string(),
            logloss: 0.31,
            brier: 0.09,
            hit_k_main: 0.2,
            hit_10: 0.25,
            k_main: 6,
            train_rows: 16,
            test_rows: 8,
            train_date_from: date,
            train_date_to: date,
            test_date_from: date,
            test_date_to: date,
            window: 1,
        }]
    }

    #[test]
    fn test_normalized_snapshot_has_canonical_columns() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage.save_normalized(&sample_records()).unwrap();

        let df = crate::data::read_table(&dir.path().join(NORMALIZED_LATEST)).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, crate::data::CANONICAL_COLUMNS.to_vec());
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_results_snapshot_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage.save_results(&sample_results()).unwrap();
        storage.save_results(&sample_results()).unwrap();

        let content = fs::read_to_string(dir.path().join(RESULTS_LATEST)).unwrap();
        // Header plus exactly one data row survives the second write
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_history_accumulates_runs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage
            .append_history(&sample_results(), "viking", 1)
            .unwrap();
        storage
            .append_history(&sample_results(), "viking", 2)
            .unwrap();

        let content = fs::read_to_string(dir.path().join(RESULTS_HISTORY)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("model,"));
        assert!(lines[0].ends_with("timestamp,lottery"));
        assert!(lines[1].contains("viking"));
        // Second run's window value is echoed into its row
        assert!(lines[2].contains(",2,"));
    }
}
