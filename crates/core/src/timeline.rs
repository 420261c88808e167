//! Daily progress timeline reconstruction.
//!
//! Snapshots are a ledger with one write per change event, not one per day.
//! Rendering a dense daily chart therefore forward-fills the real series
//! between sparse writes, while today and any future days always show the
//! live-computed value -- the present may have changed since the last write.
//! The expected series is never carried forward: a stored value is used
//! when a snapshot exists for that exact day, otherwise the linear schedule
//! model recomputes it exactly.

use serde::Serialize;

use crate::progress::expected_progress;
use crate::types::Date;

/// One recorded snapshot, as read from storage. Callers supply these sorted
/// by date ascending.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPoint {
    pub date: Date,
    pub real: f64,
    pub expected: Option<f64>,
}

/// Schedule inputs for the project under reconstruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineProject {
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
}

/// A gap-filled daily series. All three vectors have equal length, one
/// entry per calendar day.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineSeries {
    pub dates: Vec<Date>,
    pub real: Vec<f64>,
    pub expected: Vec<Option<f64>>,
}

/// Reconstruct the daily real/expected series for a project.
///
/// Range: starts at the project start date, falling back to the earliest
/// snapshot; with neither, the series is empty. Ends at `end_override`, or
/// today extended to the later of the expected end date and the latest
/// snapshot. A start past the end collapses the range to the end day alone.
///
/// `live_real` is the project's current real progress, computed from live
/// task state by the caller.
pub fn build_timeline(
    project: TimelineProject,
    snapshots: &[SnapshotPoint],
    live_real: f64,
    today: Date,
    end_override: Option<Date>,
) -> TimelineSeries {
    let start = match project.start_date.or_else(|| snapshots.first().map(|s| s.date)) {
        Some(d) => d,
        None => return TimelineSeries::default(),
    };

    let end = end_override.unwrap_or_else(|| {
        let mut end = today;
        if let Some(planned) = project.expected_end_date {
            end = end.max(planned);
        }
        if let Some(last) = snapshots.last() {
            end = end.max(last.date);
        }
        end
    });

    let start = start.min(end);

    let day_count = (end - start).num_days() + 1;
    let mut series = TimelineSeries {
        dates: Vec::with_capacity(day_count as usize),
        real: Vec::with_capacity(day_count as usize),
        expected: Vec::with_capacity(day_count as usize),
    };

    // Last known real value carried forward between snapshot writes.
    let mut carried = snapshots.first().map_or(live_real, |s| s.real);
    let mut next_snapshot = 0;

    let mut day = start;
    while day <= end {
        // Advance through every snapshot recorded on this day; the last one
        // wins as the carry-forward value.
        let mut stored_expected = None;
        while next_snapshot < snapshots.len() && snapshots[next_snapshot].date == day {
            carried = snapshots[next_snapshot].real;
            stored_expected = snapshots[next_snapshot].expected;
            next_snapshot += 1;
        }

        let real = if day >= today { live_real } else { carried };
        let expected = match stored_expected {
            Some(v) => Some(v),
            None => expected_progress(project.start_date, project.expected_end_date, day),
        };

        series.dates.push(day);
        series.real.push(real);
        series.expected.push(expected);

        day = day.succ_opt().expect("date overflow");
    }

    series
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
    fn no_dates_and_no_snapshots_is_empty() {
        let series = build_timeline(
            TimelineProject::default(),
            &[],
            40.0,
            date(2024, 1, 10),
            None,
        );
        assert!(series.dates.is_empty());
        assert!(series.real.is_empty());
        assert!(series.expected.is_empty());
    }

    #[test]
    fn carry_forward_with_live_today() {
        // 10-day range starting 2024-01-01, one snapshot on day 3 (index 3)
        // with real=20, live value 40, today = day 10 (2024-01-11... use
        // 11-day window 01..=11 to have indexes 0..=10).
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: None,
        };
        let snapshots = [snap(date(2024, 1, 4), 20.0)];
        let today = date(2024, 1, 11);
        let series = build_timeline(project, &snapshots, 40.0, today, None);

        assert_eq!(series.dates.len(), 11);
        // Days before the first snapshot use the seed (first snapshot's real).
        assert_eq!(&series.real[0..3], &[20.0, 20.0, 20.0]);
        // Snapshot day through yesterday carry the stored value.
        assert_eq!(&series.real[3..10], &[20.0; 7]);
        // Today reflects live state, not the ledger.
        assert_eq!(series.real[10], 40.0);
    }

    #[test]
    fn seed_is_live_value_when_no_snapshots() {
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: None,
        };
        let series = build_timeline(project, &[], 35.0, date(2024, 1, 3), None);
        assert_eq!(series.real, vec![35.0, 35.0, 35.0]);
    }

    #[test]
    fn range_starts_at_earliest_snapshot_without_project_start() {
        let project = TimelineProject::default();
        let snapshots = [snap(date(2024, 1, 5), 10.0), snap(date(2024, 1, 7), 30.0)];
        let series = build_timeline(project, &snapshots, 30.0, date(2024, 1, 8), None);
        assert_eq!(series.dates.first(), Some(&date(2024, 1, 5)));
        assert_eq!(series.dates.last(), Some(&date(2024, 1, 8)));
        assert_eq!(series.real, vec![10.0, 10.0, 30.0, 30.0]);
    }

    #[test]
    fn end_extends_to_expected_end_and_latest_snapshot() {
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: Some(date(2024, 1, 15)),
        };
        // A snapshot even past the planned end stretches the range further.
        let snapshots = [snap(date(2024, 1, 20), 80.0)];
        let series = build_timeline(project, &snapshots, 80.0, date(2024, 1, 10), None);
        assert_eq!(series.dates.last(), Some(&date(2024, 1, 20)));
    }

    #[test]
    fn future_days_use_live_value() {
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: Some(date(2024, 1, 5)),
        };
        let snapshots = [snap(date(2024, 1, 1), 10.0)];
        let today = date(2024, 1, 3);
        let series = build_timeline(project, &snapshots, 42.0, today, None);
        // Days 3, 4, 5 are today-or-later.
        assert_eq!(series.real, vec![10.0, 10.0, 42.0, 42.0, 42.0]);
    }

    #[test]
    fn start_after_end_collapses_to_single_day() {
        let project = TimelineProject {
            start_date: Some(date(2024, 6, 1)),
            expected_end_date: None,
        };
        let series = build_timeline(project, &[], 0.0, date(2024, 1, 10), Some(date(2024, 1, 10)));
        assert_eq!(series.dates, vec![date(2024, 1, 10)]);
    }

    #[test]
    fn expected_prefers_stored_snapshot_value() {
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: Some(date(2024, 1, 11)),
        };
        // Stored expected deliberately disagrees with the formula.
        let snapshots = [SnapshotPoint {
            date: date(2024, 1, 6),
            real: 50.0,
            expected: Some(77.7),
        }];
        let series = build_timeline(project, &snapshots, 50.0, date(2024, 1, 11), None);
        // Day 6 (index 5) uses the stored value; its neighbours recompute.
        assert_eq!(series.expected[5], Some(77.7));
        assert_eq!(series.expected[4], Some(40.0));
        assert_eq!(series.expected[6], Some(60.0));
    }

    #[test]
    fn expected_is_none_without_schedule_dates() {
        let project = TimelineProject::default();
        let snapshots = [snap(date(2024, 1, 5), 10.0)];
        let series = build_timeline(project, &snapshots, 10.0, date(2024, 1, 6), None);
        assert!(series.expected.iter().all(Option::is_none));
    }

    #[test]
    fn arrays_share_length() {
        let project = TimelineProject {
            start_date: Some(date(2024, 1, 1)),
            expected_end_date: Some(date(2024, 2, 1)),
        };
        let snapshots = [snap(date(2024, 1, 3), 5.0), snap(date(2024, 1, 20), 60.0)];
        let series = build_timeline(project, &snapshots, 61.0, date(2024, 1, 25), None);
        assert_eq!(series.dates.len(), series.real.len());
        assert_eq!(series.dates.len(), series.expected.len());
    }
}
