//! Format detection and normalization
//!
//! Recognizes the two supported input schemas by column-name presence and
//! converts either into the canonical draw table: `draw_no, date, n1..n6,
//! b1, b2`, sorted by ascending date.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::data::validate;
use crate::error::AppError;

/// Columns identifying the operator's raw ticket export
pub const RAW_COLUMNS: [&str; 3] = ["Izlozes Nr.", "Datums", "Izlozētie skaitļi"];

/// Columns required of an already-prepared file
pub const PREPARED_COLUMNS: [&str; 7] = ["draw_no", "date", "n1", "n2", "n3", "n4", "n5"];

/// The canonical schema, in column order
pub const CANONICAL_COLUMNS: [&str; 10] = [
    "draw_no", "date", "n1", "n2", "n3", "n4", "n5", "n6", "b1", "b2",
];

/// One canonical draw: operator draw id, calendar date, main-number slots
/// `n1..n6` and bonus slots `b1..b2` (nullable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub draw_no: String,
    pub date: NaiveDate,
    pub mains: [Option<i64>; 6],
    pub bonus: [Option<i64>; 2],
}

impl DrawRecord {
    /// Non-null main numbers, slot order
    pub fn main_numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.mains.iter().flatten().copied()
    }

    /// Non-null bonus numbers, slot order
    pub fn bonus_numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.bonus.iter().flatten().copied()
    }
}

/// True when the table carries the raw ticket-export columns
pub fn is_raw(df: &DataFrame) -> bool {
    has_columns(df, &RAW_COLUMNS)
}

/// True when the table carries the prepared-schema columns
pub fn is_prepared(df: &DataFrame) -> bool {
    has_columns(df, &PREPARED_COLUMNS)
}

fn has_columns(df: &DataFrame, required: &[&str]) -> bool {
    let names = df.get_column_names();
    required
        .iter()
        .all(|req| names.iter().any(|name| name.as_str() == *req))
}

/// Normalize a loaded table under the declared file format, then cross-check
/// the declared lottery type against the data (see [`validate`]).
pub fn normalize_any(
    df: &DataFrame,
    lottery: &str,
    file_format: &str,
) -> Result<Vec<DrawRecord>, AppError> {
    let records = match file_format {
        "raw" => {
            if !is_raw(df) {
                return Err(AppError::MissingColumns("RAW".to_string()));
            }
            normalize_raw(df)?
        }
        "prepared" => {
            if !is_prepared(df) {
                return Err(AppError::MissingColumns("Prepared".to_string()));
            }
            normalize_prepared(df)?
        }
        other => return Err(AppError::UnknownFormat(other.to_string())),
    };

    validate::check_lottery_safety(&records, lottery)?;

    Ok(records)
}

/// Normalize the raw ticket export: parse the combined numbers field into
/// sorted main/bonus slots, parse dates day-first, sort by date.
pub fn normalize_raw(df: &DataFrame) -> Result<Vec<DrawRecord>, AppError> {
    let draw_col = df.column(RAW_COLUMNS[0])?;
    let date_col = df.column(RAW_COLUMNS[1])?;
    let numbers_col = df.column(RAW_COLUMNS[2])?;

    let mut records = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let draw_no = cell_text(draw_col, i).unwrap_or_default();
        let date_raw = cell_text(date_col, i)
            .ok_or_else(|| AppError::Table(format!("row {}: missing draw date", i)))?;
        let date = parse_date_dayfirst(&date_raw)?;

        let (mut mains, mut bonuses) = match cell_text(numbers_col, i) {
            Some(text) => split_main_and_bonus(&text),
            None => (Vec::new(), Vec::new()),
        };
        mains.sort_unstable();
        bonuses.sort_unstable();

        let mut rec = DrawRecord {
            draw_no,
            date,
            mains: [None; 6],
            bonus: [None; 2],
        };
        // Sorted mains fill n1.. positionally; short lists leave trailing nulls
        for (slot, value) in rec.mains.iter_mut().zip(mains.iter()) {
            *slot = Some(*value);
        }
        for (slot, value) in rec.bonus.iter_mut().zip(bonuses.iter()) {
            *slot = Some(*value);
        }

        records.push(rec);
    }

    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Normalize an already-prepared table: coerce slot columns to nullable
/// integers, treat missing canonical columns as all-null, sort by date.
pub fn normalize_prepared(df: &DataFrame) -> Result<Vec<DrawRecord>, AppError> {
    let draw_col = df.column("draw_no")?;
    let date_col = df.column("date")?;
    let slot_cols: Vec<Option<&Column>> = CANONICAL_COLUMNS[2..]
        .iter()
        .map(|name| df.column(name).ok())
        .collect();

    let mut records = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let draw_no = cell_text(draw_col, i).unwrap_or_default();
        let date_raw = cell_text(date_col, i)
            .ok_or_else(|| AppError::Table(format!("row {}: missing draw date", i)))?;
        let date = parse_date_dayfirst(&date_raw)?;

        let mut slots = [None; 8];
        for (slot, col) in slots.iter_mut().zip(slot_cols.iter()) {
            *slot = col
                .and_then(|c| cell_text(c, i))
                .and_then(|text| coerce_integer(&text));
        }

        records.push(DrawRecord {
            draw_no,
            date,
            mains: [slots[0], slots[1], slots[2], slots[3], slots[4], slots[5]],
            bonus: [slots[6], slots[7]],
        });
    }

    records.sort_by_key(|r| r.date);
    Ok(records)
}

/// Render the canonical table as a DataFrame (dates as ISO text), used for
/// snapshots and for feeding canonical output back in as "prepared".
pub fn to_dataframe(records: &[DrawRecord]) -> Result<DataFrame, AppError> {
    let draw_nos: Vec<String> = records.iter().map(|r| r.draw_no.clone()).collect();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();

    let mut columns = vec![
        Column::new("draw_no".into(), draw_nos),
        Column::new("date".into(), dates),
    ];
    for (idx, name) in CANONICAL_COLUMNS[2..].iter().enumerate() {
        let values: Vec<Option<i64>> = records
            .iter()
            .map(|r| {
                if idx < 6 {
                    r.mains[idx]
                } else {
                    r.bonus[idx - 6]
                }
            })
            .collect();
        columns.push(Column::new((*name).into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Read a cell as trimmed text; null and blank cells become None.
fn cell_text(col: &Column, idx: usize) -> Option<String> {
    match col.get(idx).ok()? {
        AnyValue::Null => None,
        AnyValue::String(s) => non_blank(s),
        AnyValue::StringOwned(s) => non_blank(s.as_str()),
        other => Some(other.to_string()),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split the combined numbers field into (mains, bonuses).
///
/// A `+` separates mains (left) from bonuses (right); without one the whole
/// field is mains.
fn split_main_and_bonus(text: &str) -> (Vec<i64>, Vec<i64>) {
    match text.split_once('+') {
        Some((left, right)) => (parse_number_list(left), parse_number_list(right)),
        None => (parse_number_list(text), Vec::new()),
    }
}

/// Parse a delimited number list. Commas and semicolons count as whitespace;
/// tokens that are not integers are silently dropped.
fn parse_number_list(text: &str) -> Vec<i64> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<i64>().ok())
        .collect()
}

/// Coerce prepared-slot text to an integer; anything else becomes null.
fn coerce_integer(text: &str) -> Option<i64> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    // "5.0"-style floats coerce too
    match text.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}

/// Parse a free-text date, day-first, with an ISO fallback.
pub fn parse_date_dayfirst(raw: &str) -> Result<NaiveDate, AppError> {
    // Drop any time-of-day part
    let date_part = raw
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(raw);

    const FORMATS: [&str; 6] = [
        "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d",
    ];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return Ok(date);
        }
    }

    Err(AppError::Table(format!("unparsable date '{}'", raw)))
}
