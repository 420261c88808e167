//! Progress milestones: days elapsed until each threshold was first reached.
//!
//! Walks the snapshot ledger in date order and records, per threshold, the
//! day offset from project start at the first snapshot whose real progress
//! meets it. First-crossing semantics: once recorded, a threshold is never
//! revisited even if progress later dips below it.

use std::collections::BTreeMap;

use crate::timeline::SnapshotPoint;
use crate::types::Date;

/// Default milestone thresholds, in percent.
pub const DEFAULT_THRESHOLDS: &[i32] = &[0, 10, 20, 30, 50, 100];

/// Compute `threshold -> days since start` for each threshold.
///
/// `start` falls back to the earliest snapshot date; when neither exists
/// every threshold maps to `None`. Threshold 0 is 0 days by definition
/// whenever a start date resolves.
pub fn milestones(
    start: Option<Date>,
    snapshots: &[SnapshotPoint],
    thresholds: &[i32],
) -> BTreeMap<i32, Option<i64>> {
    let mut sorted: Vec<&SnapshotPoint> = snapshots.iter().collect();
    sorted.sort_by_key(|s| s.date);

    let mut result: BTreeMap<i32, Option<i64>> =
        thresholds.iter().map(|&t| (t, None)).collect();

    let start = match start.or_else(|| sorted.first().map(|s| s.date)) {
        Some(d) => d,
        None => return result,
    };

    if let Some(zero) = result.get_mut(&0) {
        *zero = Some(0);
    }

    let mut remaining: Vec<i32> = thresholds.iter().copied().filter(|&t| t != 0).collect();
    for snapshot in sorted {
        let pct = snapshot.real;
        remaining.retain(|&t| {
            if pct >= f64::from(t) {
                result.insert(t, Some((snapshot.date - start).num_days()));
                false
            } else {
                true
            }
        });
        if remaining.is_empty() {
            break;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn snap(d: Date, real: f64) -> SnapshotPoint {
        SnapshotPoint {
            date: d,
            real,
            expected: None,
        }
    }

    #[test]
    fn no_start_and_no_snapshots_is_all_none() {
        let result = milestones(None, &[], DEFAULT_THRESHOLDS);
        assert_eq!(result.len(), DEFAULT_THRESHOLDS.len());
        assert!(result.values().all(Option::is_none));
    }

    #[test]
    fn zero_threshold_is_zero_days_with_start() {
        let result = milestones(Some(date(2024, 1, 1)), &[], DEFAULT_THRESHOLDS);
        assert_eq!(result[&0], Some(0));
        assert_eq!(result[&10], None);
    }

    #[test]
    fn first_crossing_records_day_offset() {
        let start = date(2024, 1, 1);
        let snapshots = [
            snap(date(2024, 1, 3), 12.0),
            snap(date(2024, 1, 8), 35.0),
            snap(date(2024, 1, 20), 100.0),
        ];
        let result = milestones(Some(start), &snapshots, DEFAULT_THRESHOLDS);
        assert_eq!(result[&0], Some(0));
        assert_eq!(result[&10], Some(2));
        assert_eq!(result[&20], Some(7));
        assert_eq!(result[&30], Some(7));
        assert_eq!(result[&50], Some(19));
        assert_eq!(result[&100], Some(19));
    }

    #[test]
    fn dips_do_not_unrecord_a_crossing() {
        let start = date(2024, 1, 1);
        let snapshots = [
            snap(date(2024, 1, 2), 25.0),
            snap(date(2024, 1, 5), 5.0),
            snap(date(2024, 1, 9), 26.0),
        ];
        let result = milestones(Some(start), &snapshots, DEFAULT_THRESHOLDS);
        // 20 was first reached on day 1 and stays there despite the dip.
        assert_eq!(result[&20], Some(1));
        assert_eq!(result[&30], None);
    }

    #[test]
    fn start_falls_back_to_earliest_snapshot() {
        let snapshots = [snap(date(2024, 2, 10), 15.0), snap(date(2024, 2, 14), 55.0)];
        let result = milestones(None, &snapshots, DEFAULT_THRESHOLDS);
        assert_eq!(result[&0], Some(0));
        assert_eq!(result[&10], Some(0));
        assert_eq!(result[&50], Some(4));
    }

    #[test]
    fn unsorted_input_is_sorted_internally() {
        let start = date(2024, 1, 1);
        let snapshots = [
            snap(date(2024, 1, 9), 60.0),
            snap(date(2024, 1, 2), 15.0),
        ];
        let result = milestones(Some(start), &snapshots, DEFAULT_THRESHOLDS);
        assert_eq!(result[&10], Some(1));
        assert_eq!(result[&50], Some(8));
    }

    #[test]
    fn day_counts_monotonic_in_threshold_order() {
        let start = date(2024, 1, 1);
        let snapshots = [
            snap(date(2024, 1, 2), 8.0),
            snap(date(2024, 1, 4), 22.0),
            snap(date(2024, 1, 6), 19.0),
            snap(date(2024, 1, 9), 51.0),
            snap(date(2024, 1, 15), 100.0),
        ];
        let result = milestones(Some(start), &snapshots, DEFAULT_THRESHOLDS);
        let mut last = Some(-1);
        for &t in DEFAULT_THRESHOLDS {
            if let Some(days) = result[&t] {
                assert!(Some(days) >= last, "threshold {t} regressed");
                last = Some(days);
            }
        }
    }
}
