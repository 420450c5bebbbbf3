//! Month labels for heatmap columns
//!
//! Each week column gets the short name of the month its first real day falls
//! in, but only the first column to reach a given (year, month) is labeled.
//! Names come from an injected [`NameTable`] so output never depends on the
//! host locale.

use crate::types::{HeatmapGrid, MonthLabelRow, DAYS_PER_WEEK};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed short names for months and weekdays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTable {
    /// January first
    pub months: [String; 12],
    /// Monday first, matching the grid rows
    pub weekdays: [String; DAYS_PER_WEEK],
}

impl Default for NameTable {
    fn default() -> Self {
        Self::english()
    }
}

impl NameTable {
    /// English three-letter names
    pub fn english() -> Self {
        Self {
            months: [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]
            .map(String::from),
            weekdays: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].map(String::from),
        }
    }

    /// Short name for a 1-based month number
    ///
    /// # Panics
    /// If `month` is not in `1..=12`.
    pub fn month(&self, month: u32) -> &str {
        assert!((1..=12).contains(&month), "month out of range: {month}");
        &self.months[month as usize - 1]
    }

    /// Short name for a Monday-based row index
    ///
    /// # Panics
    /// If `row` is 7 or more.
    pub fn weekday(&self, row: usize) -> &str {
        &self.weekdays[row]
    }
}

/// Assign one optional month label per week column.
pub fn assign_labels(grid: &HeatmapGrid, names: &NameTable) -> MonthLabelRow {
    let mut seen: HashSet<(i32, u32)> = HashSet::new();

    let labels = grid
        .weeks
        .iter()
        .map(|week| {
            // All-padding columns only occur at the very start
            let first = week.iter().find_map(|cell| cell.date())?;
            let key = (first.year(), first.month());
            seen.insert(key).then(|| names.month(key.1).to_string())
        })
        .collect();

    MonthLabelRow(labels)
}
