//! Lagged feature construction
//!
//! Each draw becomes a fixed-width one-hot vector over the lottery's
//! main-number range; consecutive draws pair into (previous, current)
//! supervised examples.

use chrono::NaiveDate;

use crate::data::normalize::DrawRecord;

/// One supervised example: the previous draw's vector predicts the current
/// draw's vector.
#[derive(Debug, Clone)]
pub struct LaggedDraw {
    pub date: NaiveDate,
    pub prev: Vec<f64>,
    pub curr: Vec<f64>,
}

/// One-hot encode a draw's main numbers over `[1, width]`.
///
/// Values outside the range are ignored.
pub fn one_hot(record: &DrawRecord, width: usize) -> Vec<f64> {
    let mut vec = vec![0.0; width];
    for value in record.main_numbers() {
        if value >= 1 && value <= width as i64 {
            vec[(value - 1) as usize] = 1.0;
        }
    }
    vec
}

/// Build the lagged dataset: rows sorted by ascending date, each paired with
/// its immediate predecessor. The first chronological draw has no
/// predecessor and contributes no row.
pub fn build_lagged(records: &[DrawRecord], width: usize) -> Vec<LaggedDraw> {
    let mut ordered: Vec<&DrawRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let vectors: Vec<Vec<f64>> = ordered.iter().map(|r| one_hot(r, width)).collect();

    ordered
        .iter()
        .zip(vectors.iter())
        .enumerate()
        .skip(1)
        .map(|(i, (rec, curr))| LaggedDraw {
            date: rec.date,
            prev: vectors[i - 1].clone(),
            curr: curr.clone(),
        })
        .collect()
}
