//! Per-habit lifetime statistics
//!
//! A habit is tracked from whichever comes first, its creation day or its
//! earliest check-in, through the evaluation day.

use crate::date_key::CalendarDay;
use crate::types::{CheckinEvent, HabitStats, HabitSummary};

/// Completion totals for `habit` as of `evaluation_day`.
///
/// Every check-in of the habit counts toward the total, whatever its date.
/// The percentage is 0 when tracking has not started by `evaluation_day`.
pub fn habit_stats(
    habit: &HabitSummary,
    checkins: &[CheckinEvent],
    evaluation_day: CalendarDay,
) -> HabitStats {
    let own: Vec<&CheckinEvent> = checkins.iter().filter(|c| c.habit_id == habit.id).collect();

    let total_completed = own.len();
    let first_checkin = own.iter().map(|c| c.date).min();
    let created = habit.created_at.map(|at| at.date_naive());

    let start = match (created, first_checkin) {
        (Some(created), Some(first)) => created.min(first),
        (Some(day), None) | (None, Some(day)) => day,
        (None, None) => evaluation_day,
    };

    let days_tracked = (evaluation_day - start).num_days() + 1;
    let completion_percentage = if days_tracked > 0 {
        total_completed as f64 / days_tracked as f64 * 100.0
    } else {
        0.0
    };

    HabitStats {
        habit_id: habit.id.clone(),
        total_completed,
        completion_percentage,
        days_tracked,
        current_streak: habit.current_streak,
    }
}
