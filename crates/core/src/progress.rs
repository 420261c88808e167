//! Project progress aggregation.
//!
//! Two measures are computed for a project at a reference date:
//!
//! - **real progress**, derived from its task percentages. While every task
//!   sits at exactly 0 or 100 the completed fraction is used; as soon as any
//!   task records partial progress the arithmetic mean of all percentages
//!   becomes the measure, since the completed fraction is too coarse once
//!   partial values exist.
//! - **expected progress**, a linear schedule model between the project's
//!   start and expected end dates.
//!
//! Both are clamped to [0, 100] and quantized to one decimal place.

use serde::Serialize;

use crate::types::Date;

/// Percentage delta at or above which a project counts as ahead of schedule.
pub const AHEAD_DELTA: f64 = 2.0;

/// Aggregated task statistics for one project, produced by a single
/// grouped query across all projects of a list view.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskStats {
    /// Total number of tasks under the project's categories.
    pub total: i64,
    /// Tasks whose status is completed.
    pub completed: i64,
    /// Mean of all task percentages, if any tasks exist.
    pub avg_percent: Option<f64>,
    /// Tasks whose percentage is strictly between 0 and 100.
    pub partial: i64,
}

/// Schedule classification derived from `real - expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Ahead,
    OnSchedule,
    Behind,
}

impl ScheduleStatus {
    pub fn from_delta(delta: f64) -> Self {
        if delta >= AHEAD_DELTA {
            Self::Ahead
        } else if delta >= 0.0 {
            Self::OnSchedule
        } else {
            Self::Behind
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ahead => "Ahead",
            Self::OnSchedule => "On schedule",
            Self::Behind => "Behind",
        }
    }
}

/// Progress summary for one project in a list/overview view.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub real: f64,
    pub expected: Option<f64>,
    pub delta: Option<f64>,
    pub schedule: Option<ScheduleStatus>,
    pub has_no_tasks: bool,
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Quantize a percentage to one decimal place, rounding half up.
pub fn quantize_pct(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Real progress from aggregated task statistics.
///
/// Mean of all percentages once any task shows partial progress; completed
/// fraction otherwise; 0.0 for a project with no tasks.
pub fn real_progress(stats: &TaskStats) -> f64 {
    let raw = match stats.avg_percent {
        Some(avg) if stats.partial > 0 => avg,
        _ if stats.total > 0 => (stats.completed as f64 / stats.total as f64) * 100.0,
        _ => 0.0,
    };
    quantize_pct(clamp_pct(raw))
}

/// Expected progress at `reference` under a linear schedule.
///
/// `None` when the project lacks either date. Zero-length plans jump from
/// 0 to 100 on the end date.
pub fn expected_progress(
    start: Option<Date>,
    expected_end: Option<Date>,
    reference: Date,
) -> Option<f64> {
    let (start, end) = match (start, expected_end) {
        (Some(s), Some(e)) => (s, e),
        _ => return None,
    };

    if reference < start {
        return Some(0.0);
    }
    if reference > end {
        return Some(100.0);
    }

    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return Some(if reference >= end { 100.0 } else { 0.0 });
    }

    let days_passed = (reference - start).num_days();
    let pct = (days_passed as f64 / total_days as f64) * 100.0;
    Some(quantize_pct(clamp_pct(pct)))
}

/// Combine task statistics and schedule dates into a list-view summary.
pub fn progress_view(
    stats: &TaskStats,
    start: Option<Date>,
    expected_end: Option<Date>,
    reference: Date,
) -> ProgressView {
    let real = real_progress(stats);
    let expected = expected_progress(start, expected_end, reference);

    let (delta, schedule) = match expected {
        Some(exp) => {
            let delta = quantize_pct_signed(real - exp);
            (Some(delta), Some(ScheduleStatus::from_delta(delta)))
        }
        None => (None, None),
    };

    ProgressView {
        real,
        expected,
        delta,
        schedule,
        has_no_tasks: stats.total == 0,
    }
}

/// Quantize a possibly-negative delta to one decimal, rounding half away
/// from zero.
fn quantize_pct_signed(value: f64) -> f64 {
    if value < 0.0 {
        -quantize_pct(-value)
    } else {
        quantize_pct(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats(total: i64, completed: i64, avg: Option<f64>, partial: i64) -> TaskStats {
        TaskStats {
            total,
            completed,
            avg_percent: avg,
            partial,
        }
    }

    // -- quantize_pct --

    #[test]
    fn quantize_rounds_half_up() {
        assert_eq!(quantize_pct(49.95), 50.0);
        assert_eq!(quantize_pct(49.94), 49.9);
        assert_eq!(quantize_pct(33.333), 33.3);
        assert_eq!(quantize_pct(66.666), 66.7);
    }

    // -- real_progress --

    #[test]
    fn no_tasks_is_zero() {
        assert_eq!(real_progress(&stats(0, 0, None, 0)), 0.0);
    }

    #[test]
    fn binary_tasks_use_completed_fraction() {
        // 4 tasks at [0, 0, 100, 100]: no partial progress.
        assert_eq!(real_progress(&stats(4, 2, Some(50.0), 0)), 50.0);
        assert_eq!(real_progress(&stats(3, 1, Some(33.33), 0)), 33.3);
    }

    #[test]
    fn partial_progress_switches_to_mean() {
        // [50, 0, 100]: one partial task -> mean of all.
        assert_eq!(real_progress(&stats(3, 1, Some(50.0), 1)), 50.0);
    }

    #[test]
    fn formula_jump_when_task_leaves_binary_grid() {
        // [0, 100]: fraction = 50.0. Nudge the first task to 1%:
        // mean([1, 100]) = 50.5. The jump between formulas is preserved
        // behavior from the measure's definition.
        assert_eq!(real_progress(&stats(2, 1, Some(50.0), 0)), 50.0);
        assert_eq!(real_progress(&stats(2, 1, Some(50.5), 1)), 50.5);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        // [33, 33, 34] -> 33.333...
        assert_eq!(real_progress(&stats(3, 0, Some(100.0 / 3.0), 3)), 33.3);
    }

    // -- expected_progress --

    #[test]
    fn missing_dates_yield_none() {
        let d = date(2024, 1, 5);
        assert_eq!(expected_progress(None, Some(d), d), None);
        assert_eq!(expected_progress(Some(d), None, d), None);
        assert_eq!(expected_progress(None, None, d), None);
    }

    #[test]
    fn ten_day_plan_midpoint() {
        // start=2024-01-01, end=2024-01-11 (10 days). Day 5 -> 50%.
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 11);
        assert_eq!(expected_progress(Some(start), Some(end), date(2024, 1, 6)), Some(50.0));
        assert_eq!(expected_progress(Some(start), Some(end), start), Some(0.0));
        assert_eq!(expected_progress(Some(start), Some(end), date(2024, 1, 12)), Some(100.0));
    }

    #[test]
    fn before_start_is_zero() {
        let start = date(2024, 1, 10);
        let end = date(2024, 1, 20);
        assert_eq!(
            expected_progress(Some(start), Some(end), date(2024, 1, 1)),
            Some(0.0)
        );
    }

    #[test]
    fn zero_length_plan_jumps_at_end() {
        let d = date(2024, 1, 10);
        assert_eq!(expected_progress(Some(d), Some(d), d), Some(100.0));
        assert_eq!(
            expected_progress(Some(d), Some(d), date(2024, 1, 9)),
            Some(0.0)
        );
    }

    #[test]
    fn expected_is_monotonic_in_reference_date() {
        let start = date(2024, 2, 1);
        let end = date(2024, 3, 13);
        let mut previous = -1.0;
        for offset in 0..60 {
            let day = date(2024, 1, 20) + chrono::Duration::days(offset);
            let value = expected_progress(Some(start), Some(end), day).unwrap();
            assert!(value >= previous, "not monotonic at {day}");
            assert!((0.0..=100.0).contains(&value));
            previous = value;
        }
    }

    // -- progress_view --

    #[test]
    fn delta_classification() {
        assert_eq!(ScheduleStatus::from_delta(2.0), ScheduleStatus::Ahead);
        assert_eq!(ScheduleStatus::from_delta(5.3), ScheduleStatus::Ahead);
        assert_eq!(ScheduleStatus::from_delta(1.9), ScheduleStatus::OnSchedule);
        assert_eq!(ScheduleStatus::from_delta(0.0), ScheduleStatus::OnSchedule);
        assert_eq!(ScheduleStatus::from_delta(-0.1), ScheduleStatus::Behind);
    }

    #[test]
    fn schedule_labels() {
        assert_eq!(ScheduleStatus::Ahead.label(), "Ahead");
        assert_eq!(ScheduleStatus::OnSchedule.label(), "On schedule");
        assert_eq!(ScheduleStatus::Behind.label(), "Behind");
    }

    #[test]
    fn view_without_schedule_has_no_delta() {
        let view = progress_view(&stats(2, 1, Some(50.0), 0), None, None, date(2024, 1, 1));
        assert_eq!(view.real, 50.0);
        assert_eq!(view.expected, None);
        assert_eq!(view.delta, None);
        assert_eq!(view.schedule, None);
    }

    #[test]
    fn view_with_schedule_classifies() {
        // 10-day plan, day 5: expected 50. Real 55 -> ahead by 5.
        let view = progress_view(
            &stats(10, 0, Some(55.0), 10),
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 11)),
            date(2024, 1, 6),
        );
        assert_eq!(view.expected, Some(50.0));
        assert_eq!(view.delta, Some(5.0));
        assert_eq!(view.schedule, Some(ScheduleStatus::Ahead));
    }

    #[test]
    fn negative_delta_rounds_away_from_zero() {
        // real 10.0, expected 10.05 -> delta -0.05 -> -0.1 after rounding.
        let delta = super::quantize_pct_signed(10.0 - 10.05);
        assert_eq!(delta, -0.1);
    }

    #[test]
    fn empty_project_flagged() {
        let view = progress_view(&stats(0, 0, None, 0), None, None, date(2024, 1, 1));
        assert!(view.has_no_tasks);
        assert_eq!(view.real, 0.0);
    }
}
