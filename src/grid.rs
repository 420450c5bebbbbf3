//! Heatmap grid construction
//!
//! Lays the trailing window of calendar days out as Monday-first week columns:
//! 1. Window = `evaluation_day - (days - 1)` through `evaluation_day`
//! 2. Left-pad so the first day lands on its weekday row
//! 3. One `Day` cell per window day, carrying its count and today flag
//! 4. Chunk into columns of seven, right-padding the last one
//!
//! Also builds flat per-day counts over an explicit `from..=to` range.

use crate::date_key::{format_date_key, CalendarDay};
use crate::error::ComputeError;
use crate::intensity::Intensity;
use crate::types::{DayCount, HeatmapCell, HeatmapGrid, WeekColumn, DAYS_PER_WEEK};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

/// Default heatmap window in days
pub const DEFAULT_HEATMAP_DAYS: u32 = 365;

/// Longest window or range accepted from configuration and callers (100 years)
pub const MAX_WINDOW_DAYS: u32 = 366 * 100;

/// Build the default 365-day grid ending at `evaluation_day`.
pub fn build_grid(
    counts_by_date: &HashMap<CalendarDay, u32>,
    evaluation_day: CalendarDay,
) -> HeatmapGrid {
    build_grid_with_window(counts_by_date, evaluation_day, DEFAULT_HEATMAP_DAYS)
}

/// Build a grid over the `window_days` days ending at `evaluation_day`.
///
/// # Panics
/// If `window_days` is zero.
pub fn build_grid_with_window(
    counts_by_date: &HashMap<CalendarDay, u32>,
    evaluation_day: CalendarDay,
    window_days: u32,
) -> HeatmapGrid {
    assert!(window_days > 0, "heatmap window must cover at least one day");

    let first_day = window_start(evaluation_day, window_days);
    let pad = pad_start(first_day);
    // Shorter than `window_days` when the window was clamped at the calendar's start
    let day_count = (evaluation_day - first_day).num_days() as usize + 1;

    let mut cells: Vec<HeatmapCell> = Vec::with_capacity(pad + day_count + DAYS_PER_WEEK);
    cells.extend(std::iter::repeat(HeatmapCell::Empty).take(pad));
    cells.extend(first_day.iter_days().take(day_count).map(|date| {
        HeatmapCell::Day {
            date,
            count: counts_by_date.get(&date).copied().unwrap_or(0),
            is_today: date == evaluation_day,
        }
    }));

    let weeks = cells
        .chunks(DAYS_PER_WEEK)
        .map(|chunk| {
            let mut week: WeekColumn = [HeatmapCell::Empty; DAYS_PER_WEEK];
            week[..chunk.len()].copy_from_slice(chunk);
            week
        })
        .collect();

    HeatmapGrid { weeks }
}

/// First day of the window of `window_days` days ending at `evaluation_day`.
///
/// Windows reaching past the earliest representable date start there instead.
pub fn window_start(evaluation_day: CalendarDay, window_days: u32) -> CalendarDay {
    evaluation_day
        .checked_sub_signed(Duration::days(i64::from(window_days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// Count and intensity for every day from `from` through `to`, both inclusive.
///
/// Days without check-ins are present with a count of 0. Fails when `to` is
/// before `from` or the range is longer than [`MAX_WINDOW_DAYS`].
pub fn counts_in_range(
    counts_by_date: &HashMap<CalendarDay, u32>,
    from: CalendarDay,
    to: CalendarDay,
) -> Result<Vec<DayCount>, ComputeError> {
    if to < from {
        return Err(ComputeError::InvalidRange(format!(
            "to ({}) is before from ({})",
            format_date_key(to),
            format_date_key(from)
        )));
    }

    let span = (to - from).num_days() + 1;
    if span > i64::from(MAX_WINDOW_DAYS) {
        return Err(ComputeError::InvalidRange(format!(
            "{} days requested, at most {} allowed",
            span, MAX_WINDOW_DAYS
        )));
    }

    Ok(from
        .iter_days()
        .take(span as usize)
        .map(|date| {
            let count = counts_by_date.get(&date).copied().unwrap_or(0);
            DayCount {
                date,
                count,
                intensity: Intensity::from_count(count),
            }
        })
        .collect())
}

/// Padding cells needed before `first_day`: its Monday-based weekday (Mon=0 … Sun=6)
pub fn pad_start(first_day: CalendarDay) -> usize {
    first_day.weekday().num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_grid_invariants(grid: &HeatmapGrid, today: NaiveDate) {
        // Every column has seven rows by construction; check the day sequence
        let days: Vec<NaiveDate> = grid.days().filter_map(HeatmapCell::date).collect();
        assert_eq!(days.len(), 365);
        assert_eq!(*days.last().unwrap(), today);
        assert_eq!(days[0], today - Duration::days(364));
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }

        // Each cell sits on its true weekday row
        for week in &grid.weeks {
            for (row, cell) in week.iter().enumerate() {
                if let Some(date) = cell.date() {
                    assert_eq!(date.weekday().num_days_from_monday() as usize, row);
                }
            }
        }

        // Only the trailing cells of the last column may be padding after a day
        let cells: Vec<&HeatmapCell> = grid.cells().collect();
        let first_real = cells.iter().position(|c| !c.is_empty()).unwrap();
        let last_real = cells.iter().rposition(|c| !c.is_empty()).unwrap();
        assert!(first_real < DAYS_PER_WEEK);
        assert!(cells.len() - last_real - 1 < DAYS_PER_WEEK);
        assert!(cells[first_real..=last_real].iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_grid_spans_365_days_for_many_evaluation_days() {
        let mut today = day(2023, 1, 1);
        while today < day(2025, 1, 8) {
            let grid = build_grid(&HashMap::new(), today);
            assert_grid_invariants(&grid, today);
            today = today + Duration::days(13);
        }
    }

    #[test]
    fn test_wednesday_alignment() {
        // 2024-01-17 is a Wednesday; window starts Wed 2023-01-18
        let today = day(2024, 1, 17);
        assert_eq!(today.weekday(), Weekday::Wed);

        let grid = build_grid(&HashMap::new(), today);
        let first = window_start(today, 365);
        assert_eq!(first, day(2023, 1, 18));
        assert_eq!(pad_start(first), first.weekday().num_days_from_monday() as usize);

        // Reconstruct the Monday..Sunday dates of the first column
        let monday = first - Duration::days(pad_start(first) as i64);
        assert_eq!(monday.weekday(), Weekday::Mon);
        for (row, cell) in grid.weeks[0].iter().enumerate() {
            let expected = monday + Duration::days(row as i64);
            match cell {
                HeatmapCell::Empty => assert!(expected < first),
                HeatmapCell::Day { date, .. } => assert_eq!(*date, expected),
            }
        }

        // Last column: Mon, Tue, Wed (today), then four padding cells
        let last = grid.weeks.last().unwrap();
        assert_eq!(last[2].date(), Some(today));
        assert!(last[3..].iter().all(HeatmapCell::is_empty));
    }

    #[test]
    fn test_pad_start_converts_sunday_first_numbering() {
        // Sunday-first index s maps to (s + 6) % 7
        for offset in 0..7 {
            let date = day(2024, 1, 7) + Duration::days(offset); // 2024-01-07 is a Sunday
            let sunday_first = date.weekday().num_days_from_sunday() as usize;
            assert_eq!(pad_start(date), (sunday_first + 6) % 7);
        }
    }

    #[test]
    fn test_counts_and_today_flag() {
        let today = day(2024, 3, 1);
        let mut counts = HashMap::new();
        counts.insert(today, 3);
        counts.insert(day(2024, 2, 29), 8);
        counts.insert(day(2022, 1, 1), 5); // outside the window

        let grid = build_grid(&counts, today);

        let todays: Vec<&HeatmapCell> = grid
            .days()
            .filter(|c| matches!(c, HeatmapCell::Day { is_today: true, .. }))
            .collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].count(), 3);

        let leap_day = grid.days().find(|c| c.date() == Some(day(2024, 2, 29))).unwrap();
        assert_eq!(leap_day.count(), 8);

        let total: u32 = grid.days().map(HeatmapCell::count).sum();
        assert_eq!(total, 11);
    }

    #[test]
    fn test_empty_counts_fill_window_with_zeros() {
        let grid = build_grid(&HashMap::new(), day(2024, 6, 30));
        assert!(grid.days().all(|c| c.count() == 0));
        assert_eq!(grid.days().count(), 365);
    }

    #[test]
    fn test_rollover_shifts_window() {
        let counts = HashMap::new();
        let before = build_grid(&counts, day(2024, 6, 30));
        let after = build_grid(&counts, day(2024, 7, 1));

        let first_before = before.days().next().and_then(HeatmapCell::date).unwrap();
        let first_after = after.days().next().and_then(HeatmapCell::date).unwrap();
        assert_eq!(first_after - first_before, Duration::days(1));
    }

    #[test]
    fn test_custom_window() {
        let today = day(2024, 1, 14); // Sunday
        let grid = build_grid_with_window(&HashMap::new(), today, 7);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.weeks[0][0].date(), Some(day(2024, 1, 8)));
        assert_eq!(grid.weeks[0][6].date(), Some(today));
    }

    #[test]
    #[should_panic]
    fn test_zero_window_is_a_contract_violation() {
        build_grid_with_window(&HashMap::new(), day(2024, 1, 1), 0);
    }

    #[test]
    fn test_window_start_clamps_at_earliest_date() {
        let today = day(2024, 3, 10);
        assert_eq!(window_start(today, u32::MAX), NaiveDate::MIN);
        assert_eq!(window_start(NaiveDate::MIN, 2), NaiveDate::MIN);
        assert_eq!(window_start(today, 1), today);
    }

    #[test]
    fn test_clamped_window_ends_on_evaluation_day() {
        let start = NaiveDate::MIN + Duration::days(3);
        let grid = build_grid_with_window(&HashMap::new(), start, 30);

        let days: Vec<NaiveDate> = grid.days().filter_map(HeatmapCell::date).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], NaiveDate::MIN);
        assert_eq!(*days.last().unwrap(), start);
    }

    #[test]
    fn test_counts_in_range() {
        let mut counts = HashMap::new();
        counts.insert(day(2024, 2, 28), 1);
        counts.insert(day(2024, 3, 1), 5);
        counts.insert(day(2024, 3, 2), 9); // after the range

        let range = counts_in_range(&counts, day(2024, 2, 27), day(2024, 3, 1)).unwrap();
        let dates: Vec<NaiveDate> = range.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![day(2024, 2, 27), day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]
        );
        let counts: Vec<u32> = range.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 1, 0, 5]);
        assert_eq!(range[3].intensity, Intensity::High);
    }

    #[test]
    fn test_counts_in_single_day_range() {
        let range = counts_in_range(&HashMap::new(), day(2024, 1, 1), day(2024, 1, 1)).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].count, 0);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = counts_in_range(&HashMap::new(), day(2024, 1, 2), day(2024, 1, 1));
        assert!(matches!(result, Err(ComputeError::InvalidRange(_))));
    }

    #[test]
    fn test_oversized_range_rejected() {
        let result = counts_in_range(&HashMap::new(), NaiveDate::MIN, NaiveDate::MAX);
        assert!(matches!(result, Err(ComputeError::InvalidRange(_))));
    }

    #[test]
    fn test_idempotent() {
        let mut counts = HashMap::new();
        counts.insert(day(2024, 5, 5), 2);
        let today = day(2024, 5, 10);
        assert_eq!(build_grid(&counts, today), build_grid(&counts, today));
    }
}
