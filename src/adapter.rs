//! Adapter for habit store records
//!
//! Parses the habit and check-in collections served by the habit store (JSON
//! arrays or newline-delimited JSON) into engine types, and reports records
//! that are well-formed but inconsistent with each other.

use crate::date_key::{format_date_key, CalendarDay};
use crate::error::ComputeError;
use crate::types::{CheckinEvent, HabitId, HabitSummary};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Adapter for converting store payloads to engine records
pub struct StoreAdapter;

impl StoreAdapter {
    /// Parse a JSON array of habit records
    pub fn parse_habits(json: &str) -> Result<Vec<HabitSummary>, ComputeError> {
        let habits: Vec<HabitSummary> = serde_json::from_str(json)?;
        debug!(count = habits.len(), "parsed habits");
        Ok(habits)
    }

    /// Parse a JSON array of check-in records
    pub fn parse_checkins(json: &str) -> Result<Vec<CheckinEvent>, ComputeError> {
        let checkins: Vec<CheckinEvent> = serde_json::from_str(json)?;
        debug!(count = checkins.len(), "parsed check-ins");
        Ok(checkins)
    }

    /// Parse NDJSON (one habit per line)
    pub fn parse_habits_ndjson(ndjson: &str) -> Result<Vec<HabitSummary>, ComputeError> {
        parse_ndjson(ndjson)
    }

    /// Parse NDJSON (one check-in per line)
    pub fn parse_checkins_ndjson(ndjson: &str) -> Result<Vec<CheckinEvent>, ComputeError> {
        parse_ndjson(ndjson)
    }

    /// Find check-ins that reference unknown habits or repeat a (habit, day)
    ///
    /// Neither is fatal: the engine tolerates both. The report is for callers
    /// that want to surface store inconsistencies.
    pub fn validate_checkins(
        habits: &[HabitSummary],
        checkins: &[CheckinEvent],
    ) -> Vec<ValidationIssue> {
        let known: HashSet<&HabitId> = habits.iter().map(|h| &h.id).collect();
        let mut first_seen: HashMap<(&HabitId, CalendarDay), usize> = HashMap::new();
        let mut issues = Vec::new();

        for (index, checkin) in checkins.iter().enumerate() {
            if !known.contains(&checkin.habit_id) {
                issues.push(ValidationIssue {
                    index,
                    habit_id: checkin.habit_id.clone(),
                    date: checkin.date,
                    kind: IssueKind::UnknownHabit,
                });
            }

            if let Some(&first) = first_seen.get(&(&checkin.habit_id, checkin.date)) {
                issues.push(ValidationIssue {
                    index,
                    habit_id: checkin.habit_id.clone(),
                    date: checkin.date,
                    kind: IssueKind::DuplicateCheckin { first_index: first },
                });
            } else {
                first_seen.insert((&checkin.habit_id, checkin.date), index);
            }
        }

        debug!(issues = issues.len(), "validated check-ins");
        issues
    }
}

fn parse_ndjson<T: DeserializeOwned>(ndjson: &str) -> Result<Vec<T>, ComputeError> {
    let mut records = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                return Err(ComputeError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(records)
}

/// A check-in that is inconsistent with the rest of the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Position in the check-in list
    pub index: usize,
    pub habit_id: HabitId,
    #[serde(with = "crate::date_key::serde_key")]
    pub date: CalendarDay,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// No habit with this id was supplied
    UnknownHabit,
    /// Same habit and day as an earlier check-in
    DuplicateCheckin { first_index: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = format_date_key(self.date);
        match &self.kind {
            IssueKind::UnknownHabit => {
                write!(f, "check-in #{} references unknown habit {} on {}", self.index, self.habit_id, date)
            }
            IssueKind::DuplicateCheckin { first_index } => write!(
                f,
                "check-in #{} duplicates #{} (habit {} on {})",
                self.index, first_index, self.habit_id, date
            ),
        }
    }
}
