//! Core types for the Habit Heat engine
//!
//! This module defines the records consumed from the habit store and the
//! derived structures handed to the presentation layer: heatmap cells, week
//! columns, the grid, the month label row, and the dashboard snapshot.

use crate::date_key::{serde_key, CalendarDay};
use crate::intensity::Intensity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of cells in a week column
pub const DAYS_PER_WEEK: usize = 7;

/// Opaque store identifier.
///
/// The store emits integer ids; string ids are accepted too. Both are compared
/// by their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

/// Identifier of a habit record
pub type HabitId = RecordId;

/// Identifier of a check-in record
pub type CheckinId = RecordId;

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Keep numeric ids numeric on the way back out
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => RecordId::from(n),
            RawId::Text(s) => RecordId(s),
        })
    }
}

/// A habit definition as served by the habit store (read-only here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub id: HabitId,
    pub name: String,
    /// Free-form description; the store sends an empty string for "none"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Consecutive days up to today, computed by the store
    #[serde(default, alias = "currentStreak")]
    pub current_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One completion of one habit on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEvent {
    /// Store-assigned record id, when the record came from the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CheckinId>,
    #[serde(rename = "habit", alias = "habitId", alias = "habit_id")]
    pub habit_id: HabitId,
    #[serde(with = "serde_key")]
    pub date: CalendarDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CheckinEvent {
    /// Build a bare event (no store id) for `habit_id` on `date`
    pub fn new(habit_id: impl Into<HabitId>, date: CalendarDay) -> Self {
        Self {
            id: None,
            habit_id: habit_id.into(),
            date,
            created_at: None,
        }
    }
}

/// One cell of the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeatmapCell {
    /// Padding with no calendar day behind it
    Empty,
    Day {
        #[serde(with = "serde_key")]
        date: CalendarDay,
        /// Check-ins across all habits on this day
        count: u32,
        is_today: bool,
    },
}

impl HeatmapCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, HeatmapCell::Empty)
    }

    pub fn date(&self) -> Option<CalendarDay> {
        match self {
            HeatmapCell::Empty => None,
            HeatmapCell::Day { date, .. } => Some(*date),
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            HeatmapCell::Empty => 0,
            HeatmapCell::Day { count, .. } => *count,
        }
    }
}

/// Seven cells, Monday first
pub type WeekColumn = [HeatmapCell; DAYS_PER_WEEK];

/// Week columns covering the heatmap window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    pub weeks: Vec<WeekColumn>,
}

impl HeatmapGrid {
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Every cell in column order, padding included
    pub fn cells(&self) -> impl Iterator<Item = &HeatmapCell> + '_ {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    /// Every non-padding cell, chronologically
    pub fn days(&self) -> impl Iterator<Item = &HeatmapCell> + '_ {
        self.cells().filter(|cell| !cell.is_empty())
    }
}

/// One optional short month name per week column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthLabelRow(pub Vec<Option<String>>);

impl MonthLabelRow {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.0.get(column).and_then(|slot| slot.as_deref())
    }

    /// Labels that are present, with their column index
    pub fn labeled(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|label| (i, label)))
    }
}

/// Check-ins on one day of an explicit date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    #[serde(with = "serde_key")]
    pub date: CalendarDay,
    pub count: u32,
    pub intensity: Intensity,
}

/// Lifetime completion figures for one habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: HabitId,
    /// Check-ins of any date for this habit
    pub total_completed: usize,
    /// `total_completed` over the days tracked, as a percentage (unrounded)
    pub completion_percentage: f64,
    /// Days from tracking start through the evaluation day, inclusive
    pub days_tracked: i64,
    /// Store-supplied streak, passed through
    pub current_streak: u32,
}

/// Per-habit row of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStatus {
    pub id: HabitId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub current_streak: u32,
    pub done_today: bool,
}

/// Heatmap ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapView {
    pub grid: HeatmapGrid,
    /// One slot per week column
    pub month_labels: MonthLabelRow,
    /// Row names, Monday first
    pub weekday_labels: Vec<String>,
    /// Intensity level per cell, same shape as the grid (padding is 0)
    pub intensities: Vec<[Intensity; DAYS_PER_WEEK]>,
}

/// Everything the dashboard derives for one evaluation day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(with = "serde_key")]
    pub evaluation_day: CalendarDay,
    pub habits: Vec<HabitStatus>,
    /// Listed habits with a check-in on the evaluation day
    pub done_today_count: usize,
    pub total_habits: usize,
    /// At least one habit exists and all of them are done today
    pub all_done: bool,
    /// Highest store-supplied current streak (0 with no habits)
    pub best_current_streak: u32,
    /// Rolling completion percentage; absent when no habits are tracked
    pub monthly_rate: Option<u32>,
    pub rolling_window_days: u32,
    /// Check-ins of any date
    pub all_time_total: usize,
    pub heatmap: HeatmapView,
}
