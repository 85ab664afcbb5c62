//! Experiment orchestration
//!
//! Builds the lagged dataset, splits it chronologically, fits each bundled
//! classifier and scores it on the held-out tail. The split is
//! time-respecting: the test partition always postdates the train partition.

use ndarray::Array2;
use tracing::info;

use crate::classifier::default_classifiers;
use crate::data::features::{build_lagged, LaggedDraw};
use crate::data::normalize::DrawRecord;
use crate::error::AppError;
use crate::experiment::metrics::{brier_score, clip_probabilities, hit_at_k, log_loss};
use crate::models::{ExperimentResult, Lottery};

/// Minimum lagged rows required for a meaningful train/test split
const MIN_LAGGED_ROWS: usize = 10;

/// Probability clip keeping log-loss finite
const PROB_EPS: f64 = 1e-6;

/// Fixed secondary hit-rate cutoff
const HIT_RATE_FIXED_K: usize = 10;

/// Run the three-model experiment over a validated canonical table.
///
/// `window` is echoed into each result row; it is reserved for a future
/// lag-width extension and does not alter the computation yet.
pub fn run_experiment(
    records: &[DrawRecord],
    lottery: &str,
    window: u32,
) -> Result<Vec<ExperimentResult>, AppError> {
    let lottery = Lottery::parse(lottery)?;
    let max_num = lottery.max_num();
    let k_main = lottery.k_main();

    let lagged = build_lagged(records, max_num);
    let n = lagged.len();
    if n < MIN_LAGGED_ROWS {
        return Err(AppError::InsufficientData {
            rows: n,
            min: MIN_LAGGED_ROWS,
        });
    }

    // First 70% (floor) trains, the rest tests
    let split = n * 7 / 10;
    let (train, test) = lagged.split_at(split);

    let x_train = stack(train, |row| &row.prev, max_num);
    let y_train = stack(train, |row| &row.curr, max_num);
    let x_test = stack(test, |row| &row.prev, max_num);
    let y_test = stack(test, |row| &row.curr, max_num);

    info!(
        lottery = %lottery,
        train_rows = train.len(),
        test_rows = test.len(),
        "running experiment"
    );

    let mut models = default_classifiers();
    let mut results = Vec::with_capacity(models.len());
    for model in models.iter_mut() {
        model.fit(&x_train, &y_train);
        let proba = clip_probabilities(&model.predict_proba(&x_test), PROB_EPS);

        let result = ExperimentResult {
            model: model.name().to_string(),
            logloss: log_loss(&y_test, &proba),
            brier: brier_score(&y_test, &proba),
            hit_k_main: hit_at_k(&y_test, &proba, k_main),
            hit_10: hit_at_k(&y_test, &proba, HIT_RATE_FIXED_K),
            k_main,
            train_rows: train.len(),
            test_rows: test.len(),
            train_date_from: train[0].date,
            train_date_to: train[train.len() - 1].date,
            test_date_from: test[0].date,
            test_date_to: test[test.len() - 1].date,
            window,
        };
        info!(
            model = %result.model,
            logloss = result.logloss,
            hit_k_main = result.hit_k_main,
            "model evaluated"
        );
        results.push(result);
    }

    Ok(results)
}

fn stack<F>(rows: &[LaggedDraw], pick: F, width: usize) -> Array2<f64>
where
    F: Fn(&LaggedDraw) -> &Vec<f64>,
{
    Array2::from_shape_fn((rows.len(), width), |(i, j)| pick(&rows[i])[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn viking_records(count: usize) -> Vec<DrawRecord> {
        (0..count)
            .map(|i| {
                let base = (i % 7) as i64;
                let mut rec = DrawRecord {
                    draw_no: (i + 1).to_string(),
                    date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                        + chrono::Duration::days(7 * i as i64),
                    mains: [None; 6],
                    bonus: [Some(1), None],
                };
                for (slot_idx, slot) in rec.mains.iter_mut().enumerate() {
                    *slot = Some(base * 6 + slot_idx as i64 + 1);
                }
                rec
            })
            .collect()
    }

    #[test]
    fn test_insufficient_data() {
        // 10 draws yield 9 lagged rows, one short of the minimum
        let records = viking_records(10);
        let err = run_experiment(&records, "viking", 1).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { rows: 9, .. }));
    }

    #[test]
    fn test_unknown_lottery() {
        let records = viking_records(20);
        assert!(matches!(
            run_experiment(&records, "keno", 1),
            Err(AppError::UnknownLotteryType(_))
        ));
    }

    #[test]
    fn test_three_results_with_chronological_split() {
        let records = viking_records(25);
        let results = run_experiment(&records, "viking", 3).unwrap();

        assert_eq!(results.len(), 3);
        let names: Vec<&str> = results.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(names, vec!["logreg_sgd", "random_forest", "gboost"]);

        for res in &results {
            // 24 lagged rows: 16 train, 8 test
            assert_eq!(res.train_rows, 16);
            assert_eq!(res.test_rows, 8);
            assert_eq!(res.k_main, 6);
            assert_eq!(res.window, 3);

            // Test partition postdates the train partition
            assert!(res.train_date_to < res.test_date_from);
            assert!(res.train_date_from <= res.train_date_to);
            assert!(res.test_date_from <= res.test_date_to);

            assert!(res.logloss > 0.0);
            assert!(res.brier >= 0.0 && res.brier <= 1.0);
            assert!((0.0..=1.0).contains(&res.hit_k_main));
            assert!((0.0..=1.0).contains(&res.hit_10));
        }
    }

    #[test]
    fn test_full_pipeline_from_raw_csv() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draws.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Izlozes Nr.,Datums,Izlozētie skaitļi").unwrap();
        for i in 0..15u32 {
            let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                + chrono::Duration::days(7 * i as i64);
            let base = (i % 7) as u32;
            let mains: Vec<String> = (1..=6).map(|s| (base * 6 + s).to_string()).collect();
            writeln!(
                file,
                "{},{},\"{}+{}\"",
                i + 1,
                date.format("%d.%m.%Y"),
                mains.join(","),
                base % 5 + 1
            )
            .unwrap();
        }

        let df = crate::data::read_table(&path).unwrap();
        let records = crate::data::normalize_any(&df, "viking", "raw").unwrap();
        assert_eq!(records.len(), 15);

        let results = run_experiment(&records, "viking", 1).unwrap();
        assert_eq!(results.len(), 3);
        // 14 lagged rows: 9 train, 5 test
        assert_eq!(results[0].train_rows, 9);
        assert_eq!(results[0].test_rows, 5);
    }

    #[test]
    fn test_euro_uses_its_own_k_main() {
        let records: Vec<DrawRecord> = (0..20)
            .map(|i| {
                let base = (i % 9) as i64;
                let mut rec = DrawRecord {
                    draw_no: (i + 1).to_string(),
                    date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
                        + chrono::Duration::days(7 * i as i64),
                    mains: [None; 6],
                    bonus: [Some(1), Some(2)],
                };
                for (slot_idx, slot) in rec.mains.iter_mut().take(5).enumerate() {
                    *slot = Some(base * 5 + slot_idx as i64 + 1);
                }
                rec
            })
            .collect();

        let results = run_experiment(&records, "euro", 1).unwrap();
        assert_eq!(results[0].k_main, 5);
    }
}
