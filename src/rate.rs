//! Rolling completion rate
//!
//! Percentage of possible habit-days completed over a trailing window that
//! ends on the evaluation day (inclusive).

use crate::date_key::CalendarDay;
use crate::grid::window_start;
use crate::types::{CheckinEvent, HabitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default rolling window in days
pub const DEFAULT_ROLLING_WINDOW_DAYS: u32 = 30;

/// How check-ins are counted toward the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMode {
    /// Every event counts, duplicates included (may exceed 100%)
    #[default]
    Raw,
    /// At most one completion per (habit, day)
    Distinct,
}

/// Raw rolling rate: `round(100 * events_in_window / (habit_count * window_days))`.
///
/// Returns 0 when there is nothing to track. Duplicate check-ins are counted,
/// so the result can exceed 100.
pub fn rolling_rate(
    events: &[CheckinEvent],
    habit_count: usize,
    window_days: u32,
    evaluation_day: CalendarDay,
) -> u32 {
    let done = events_in_window(events, window_days, evaluation_day).count();
    percentage(done, habit_count, window_days)
}

/// Rolling rate counting each (habit, day) at most once. Always within 0–100
/// when every event belongs to one of the `habit_count` habits.
pub fn distinct_rolling_rate(
    events: &[CheckinEvent],
    habit_count: usize,
    window_days: u32,
    evaluation_day: CalendarDay,
) -> u32 {
    let done: HashSet<(&HabitId, CalendarDay)> = events_in_window(events, window_days, evaluation_day)
        .map(|event| (&event.habit_id, event.date))
        .collect();
    percentage(done.len(), habit_count, window_days)
}

/// Rolling rate using the given counting mode
pub fn rolling_rate_with_mode(
    mode: RateMode,
    events: &[CheckinEvent],
    habit_count: usize,
    window_days: u32,
    evaluation_day: CalendarDay,
) -> u32 {
    match mode {
        RateMode::Raw => rolling_rate(events, habit_count, window_days, evaluation_day),
        RateMode::Distinct => {
            distinct_rolling_rate(events, habit_count, window_days, evaluation_day)
        }
    }
}

fn events_in_window(
    events: &[CheckinEvent],
    window_days: u32,
    evaluation_day: CalendarDay,
) -> impl Iterator<Item = &CheckinEvent> + '_ {
    // An empty window matches nothing; the rate is 0 via `percentage`
    let first = window_start(evaluation_day, window_days.max(1));
    events
        .iter()
        .filter(move |event| window_days > 0 && event.date >= first && event.date <= evaluation_day)
}

fn percentage(done: usize, habit_count: usize, window_days: u32) -> u32 {
    let possible = habit_count as u64 * u64::from(window_days);
    if possible == 0 {
        return 0;
    }
    ((done as f64 / possible as f64) * 100.0).round() as u32
}
