//! Check-in indexing
//!
//! Groups raw check-in events by calendar day in a single pass:
//! - per-day event counts (duplicates counted, feeds heatmap intensity)
//! - per-day habit sets (duplicates collapsed, feeds "done today")

use crate::date_key::CalendarDay;
use crate::types::{CheckinEvent, HabitId};
use std::collections::{HashMap, HashSet};

/// Lookup tables built from a batch of check-ins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinIndex {
    counts_by_date: HashMap<CalendarDay, u32>,
    habits_by_date: HashMap<CalendarDay, HashSet<HabitId>>,
    total: usize,
}

impl CheckinIndex {
    /// Index a batch of events. Input order does not matter.
    pub fn build(events: &[CheckinEvent]) -> Self {
        let mut counts_by_date: HashMap<CalendarDay, u32> = HashMap::new();
        let mut habits_by_date: HashMap<CalendarDay, HashSet<HabitId>> = HashMap::new();

        for event in events {
            *counts_by_date.entry(event.date).or_insert(0) += 1;
            habits_by_date
                .entry(event.date)
                .or_default()
                .insert(event.habit_id.clone());
        }

        Self {
            counts_by_date,
            habits_by_date,
            total: events.len(),
        }
    }

    /// Events on `date` across all habits
    pub fn count_on(&self, date: CalendarDay) -> u32 {
        self.counts_by_date.get(&date).copied().unwrap_or(0)
    }

    /// Habits with at least one event on `date`
    pub fn habits_on(&self, date: CalendarDay) -> Option<&HashSet<HabitId>> {
        self.habits_by_date.get(&date)
    }

    /// Whether `habit` has at least one event on `date`
    pub fn is_done(&self, habit: &HabitId, date: CalendarDay) -> bool {
        self.habits_on(date)
            .map(|habits| habits.contains(habit))
            .unwrap_or(false)
    }

    /// Distinct habits completed on `date`
    pub fn done_count(&self, date: CalendarDay) -> usize {
        self.habits_on(date).map(HashSet::len).unwrap_or(0)
    }

    /// Date → count table consumed by the grid builder
    pub fn counts_by_date(&self) -> &HashMap<CalendarDay, u32> {
        &self.counts_by_date
    }

    /// Number of events indexed
    pub fn total(&self) -> usize {
        self.total
    }
}
