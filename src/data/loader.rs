//! Table reading for draw datasets
//!
//! Loads CSV or Excel files into a DataFrame keyed purely on file extension.
//! Every column comes back as text; schema interpretation happens later in
//! the normalizer.

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::Path;

use crate::error::AppError;

/// Load a tabular file into an all-text DataFrame.
///
/// `.csv` parses as comma-separated values; `.xlsx`/`.xls` parse the first
/// sheet. Any other extension fails with [`AppError::UnsupportedFormat`].
pub fn read_table(path: &Path) -> Result<DataFrame, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xls" => read_excel(path),
        other => Err(AppError::UnsupportedFormat(format!(".{}", other))),
    }
}

fn read_csv(path: &Path) -> Result<DataFrame, AppError> {
    // Schema inference off: every column is read as text so heterogeneous
    // number encodings survive until the normalizer parses them.
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

fn read_excel(path: &Path) -> Result<DataFrame, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| AppError::Table(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Table("workbook has no sheets".to_string()))?
        .map_err(|e| AppError::Table(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AppError::Table("sheet has no header row".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_text(cell).unwrap_or_default())
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, _) in headers.iter().enumerate() {
            columns[i].push(row.get(i).and_then(cell_to_text));
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Render a spreadsheet cell as text, or None for empty/error cells.
///
/// Date cells render day-first so both file families flow through one date
/// parser downstream.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d.%m.%Y").to_string())
            .or_else(|| Some(dt.as_f64().to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
