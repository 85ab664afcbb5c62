//! Lottery-safety validation
//!
//! Guards against analyzing a dataset under the wrong lottery assumption:
//! the canonical table's structural signature (main/bonus counts, value
//! maxima) is cross-checked against the caller-declared lottery type.

use crate::data::normalize::DrawRecord;
use crate::error::AppError;
use crate::models::Lottery;

/// Lottery type detected from data structure alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedLottery {
    Viking,
    Euro,
    Unknown,
}

/// Structural signature of a canonical table
#[derive(Debug, Default)]
struct TableSignature {
    main_counts: Vec<usize>,
    bonus_counts: Vec<usize>,
    max_main: i64,
    max_bonus: i64,
}

fn signature(records: &[DrawRecord]) -> TableSignature {
    let mut sig = TableSignature::default();

    for rec in records {
        let mains: Vec<i64> = rec.main_numbers().collect();
        let bonuses: Vec<i64> = rec.bonus_numbers().collect();

        if let Some(&max) = mains.iter().max() {
            sig.max_main = sig.max_main.max(max);
        }
        if let Some(&max) = bonuses.iter().max() {
            sig.max_bonus = sig.max_bonus.max(max);
        }

        sig.main_counts.push(mains.len());
        sig.bonus_counts.push(bonuses.len());
    }

    sig
}

/// Detect the lottery type from the data's structural signature.
///
/// Viking Lotto: 6 main numbers (≤ 48) and exactly 1 bonus per draw.
/// Eurojackpot: 5 main numbers (≤ 50) and 0 or 2 bonuses per draw.
pub fn detect_lottery(records: &[DrawRecord]) -> DetectedLottery {
    let sig = signature(records);

    if sig.max_main <= 48
        && sig.main_counts.iter().all(|&c| c == 6)
        && sig.bonus_counts.iter().all(|&b| b == 1)
    {
        return DetectedLottery::Viking;
    }

    if sig.max_main <= 50
        && sig.main_counts.iter().all(|&c| c == 5)
        && sig.bonus_counts.iter().all(|&b| b == 0 || b == 2)
    {
        return DetectedLottery::Euro;
    }

    DetectedLottery::Unknown
}

/// Cross-check the declared lottery type against the data.
///
/// An `Unknown` detection never blocks either declared type; only a
/// confidently opposite detection or an out-of-range value rejects the
/// table.
pub fn check_lottery_safety(records: &[DrawRecord], lottery: &str) -> Result<(), AppError> {
    let declared = Lottery::parse(lottery)?;
    let sig = signature(records);
    let detected = detect_lottery(records);

    match declared {
        Lottery::Viking => {
            if detected == DetectedLottery::Euro {
                return Err(AppError::LotteryMismatch {
                    declared: declared.to_string(),
                    detected: "Eurojackpot".to_string(),
                });
            }
            if sig.max_main > 48 {
                return Err(AppError::RangeViolation(format!(
                    "Main number {} exceeds 48, not valid for Viking Lotto",
                    sig.max_main
                )));
            }
        }
        Lottery::Euro => {
            if detected == DetectedLottery::Viking {
                return Err(AppError::LotteryMismatch {
                    declared: declared.to_string(),
                    detected: "Viking Lotto".to_string(),
                });
            }
            if sig.max_main > 50 {
                return Err(AppError::RangeViolation(format!(
                    "Main number {} exceeds 50, not valid for Eurojackpot",
                    sig.max_main
                )));
            }
            if sig.max_bonus > 12 {
                return Err(AppError::RangeViolation(format!(
                    "Bonus number {} exceeds 12, not valid for Eurojackpot",
                    sig.max_bonus
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draw(mains: &[i64], bonuses: &[i64]) -> DrawRecord {
        let mut rec = DrawRecord {
            draw_no: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            mains: [None; 6],
            bonus: [None; 2],
        };
        for (slot, v) in rec.mains.iter_mut().zip(mains) {
            *slot = Some(*v);
        }
        for (slot, v) in rec.bonus.iter_mut().zip(bonuses) {
            *slot = Some(*v);
        }
        rec
    }

    fn viking_rows() -> Vec<DrawRecord> {
        vec![
            draw(&[1, 2, 3, 4, 5, 6], &[3]),
            draw(&[7, 12, 19, 23, 40, 48], &[5]),
        ]
    }

    fn euro_rows() -> Vec<DrawRecord> {
        vec![
            draw(&[1, 2, 3, 4, 5], &[3, 7]),
            draw(&[10, 20, 30, 40, 50], &[1, 12]),
        ]
    }

    #[test]
    fn test_detect_viking() {
        assert_eq!(detect_lottery(&viking_rows()), DetectedLottery::Viking);
    }

    #[test]
    fn test_detect_euro() {
        assert_eq!(detect_lottery(&euro_rows()), DetectedLottery::Euro);
    }

    #[test]
    fn test_detect_euro_without_bonuses() {
        let rows = vec![draw(&[1, 2, 3, 4, 5], &[])];
        assert_eq!(detect_lottery(&rows), DetectedLottery::Euro);
    }

    #[test]
    fn test_detect_unknown() {
        // 4 mains matches neither signature
        let rows = vec![draw(&[1, 2, 3, 4], &[1])];
        assert_eq!(detect_lottery(&rows), DetectedLottery::Unknown);
    }

    #[test]
    fn test_declared_matches_detected() {
        assert!(check_lottery_safety(&viking_rows(), "viking").is_ok());
        assert!(check_lottery_safety(&euro_rows(), "euro").is_ok());
    }

    #[test]
    fn test_mismatch_both_directions() {
        assert!(matches!(
            check_lottery_safety(&viking_rows(), "euro"),
            Err(AppError::LotteryMismatch { .. })
        ));
        assert!(matches!(
            check_lottery_safety(&euro_rows(), "viking"),
            Err(AppError::LotteryMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_detection_passes_either_type() {
        let rows = vec![draw(&[1, 2, 3, 4], &[1])];
        assert!(check_lottery_safety(&rows, "viking").is_ok());
        assert!(check_lottery_safety(&rows, "euro").is_ok());
    }

    #[test]
    fn test_range_violation_viking() {
        let rows = vec![draw(&[1, 2, 3, 4, 49], &[1])];
        assert!(matches!(
            check_lottery_safety(&rows, "viking"),
            Err(AppError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_range_violation_euro_main() {
        let rows = vec![draw(&[1, 2, 3, 55], &[1, 2])];
        assert!(matches!(
            check_lottery_safety(&rows, "euro"),
            Err(AppError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_range_violation_euro_bonus() {
        let rows = vec![draw(&[1, 2, 3, 4], &[13, 2])];
        assert!(matches!(
            check_lottery_safety(&rows, "euro"),
            Err(AppError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_unknown_lottery_type() {
        assert!(matches!(
            check_lottery_safety(&viking_rows(), "keno"),
            Err(AppError::UnknownLotteryType(_))
        ));
    }
}
