//! Pipeline orchestration
//!
//! This module provides the public API for Habit Heat.
//! It runs every derivation for one evaluation day and packs the results into
//! a [`DashboardSnapshot`].

use crate::adapter::StoreAdapter;
use crate::config::EngineConfig;
use crate::date_key::{parse_date_key, CalendarDay};
use crate::error::ComputeError;
use crate::grid::{build_grid_with_window, counts_in_range};
use crate::index::CheckinIndex;
use crate::intensity::Intensity;
use crate::labels::assign_labels;
use crate::rate::rolling_rate_with_mode;
use crate::stats::habit_stats;
use crate::types::{
    CheckinEvent, DashboardSnapshot, DayCount, HabitStats, HabitStatus, HabitSummary, HeatmapGrid,
    HeatmapView, DAYS_PER_WEEK,
};
use tracing::debug;

/// Convert raw store JSON into a dashboard snapshot JSON.
///
/// # Arguments
/// * `habits_json` - JSON array of habit records
/// * `checkins_json` - JSON array of check-in records
/// * `evaluation_day` - The day treated as "today" (`YYYY-MM-DD`)
///
/// # Example
/// ```ignore
/// let snapshot = habits_to_dashboard(
///     habits_json,
///     checkins_json,
///     "2024-01-15".to_string(),
/// )?;
/// ```
pub fn habits_to_dashboard(
    habits_json: String,
    checkins_json: String,
    evaluation_day: String,
) -> Result<String, ComputeError> {
    DashboardEngine::new().process_json(&habits_json, &checkins_json, &evaluation_day)
}

/// Per-habit statistics JSON for every habit in `habits_json`.
pub fn habits_to_stats(
    habits_json: String,
    checkins_json: String,
    evaluation_day: String,
) -> Result<String, ComputeError> {
    let habits = StoreAdapter::parse_habits(&habits_json)?;
    let checkins = StoreAdapter::parse_checkins(&checkins_json)?;
    let day = parse_date_key(&evaluation_day)?;

    let stats = DashboardEngine::new().stats(&habits, &checkins, day);
    serde_json::to_string_pretty(&stats).map_err(ComputeError::JsonError)
}

/// Day-by-day counts JSON for the inclusive range `from`..=`to`.
pub fn checkins_to_range_counts(
    checkins_json: String,
    from: String,
    to: String,
) -> Result<String, ComputeError> {
    let checkins = StoreAdapter::parse_checkins(&checkins_json)?;
    let from = parse_date_key(&from)?;
    let to = parse_date_key(&to)?;

    let counts = DashboardEngine::new().range_counts(&checkins, from, to)?;
    serde_json::to_string_pretty(&counts).map_err(ComputeError::JsonError)
}

/// Dashboard engine carrying a fixed configuration.
///
/// Holds no state between calls; every call recomputes from its inputs.
#[derive(Debug, Clone, Default)]
pub struct DashboardEngine {
    config: EngineConfig,
}

impl DashboardEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with validated settings
    pub fn with_config(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derive the full dashboard for `evaluation_day`.
    ///
    /// Stages:
    /// 1. CheckinIndex - group check-ins by day
    /// 2. Today - per-habit completion and counters
    /// 3. Rate - rolling completion percentage
    /// 4. Grid - heatmap columns, month labels, intensities
    pub fn compute(
        &self,
        habits: &[HabitSummary],
        checkins: &[CheckinEvent],
        evaluation_day: CalendarDay,
    ) -> DashboardSnapshot {
        // Stage 1: Index check-ins
        let index = CheckinIndex::build(checkins);

        // Stage 2: Today's completion
        let statuses: Vec<HabitStatus> = habits
            .iter()
            .map(|habit| HabitStatus {
                id: habit.id.clone(),
                name: habit.name.clone(),
                description: habit.description.clone().filter(|d| !d.trim().is_empty()),
                current_streak: habit.current_streak,
                done_today: index.is_done(&habit.id, evaluation_day),
            })
            .collect();

        let total_habits = habits.len();
        // Orphan check-ins never count toward today's progress
        let done_today_count = statuses.iter().filter(|s| s.done_today).count();
        let all_done = total_habits > 0 && statuses.iter().all(|s| s.done_today);
        let best_current_streak = habits.iter().map(|h| h.current_streak).max().unwrap_or(0);

        // Stage 3: Rolling rate
        let monthly_rate = (total_habits > 0).then(|| {
            rolling_rate_with_mode(
                self.config.rate_mode,
                checkins,
                total_habits,
                self.config.rolling_window_days,
                evaluation_day,
            )
        });

        // Stage 4: Heatmap
        let heatmap = self.build_heatmap(&index, evaluation_day);

        debug!(
            %evaluation_day,
            habits = total_habits,
            checkins = index.total(),
            done_today = done_today_count,
            weeks = heatmap.grid.len(),
            "computed dashboard"
        );

        DashboardSnapshot {
            evaluation_day,
            habits: statuses,
            done_today_count,
            total_habits,
            all_done,
            best_current_streak,
            monthly_rate,
            rolling_window_days: self.config.rolling_window_days,
            all_time_total: index.total(),
            heatmap,
        }
    }

    /// Build only the heatmap view for `evaluation_day`
    pub fn heatmap(&self, checkins: &[CheckinEvent], evaluation_day: CalendarDay) -> HeatmapView {
        self.build_heatmap(&CheckinIndex::build(checkins), evaluation_day)
    }

    /// Lifetime statistics for each habit, in input order
    pub fn stats(
        &self,
        habits: &[HabitSummary],
        checkins: &[CheckinEvent],
        evaluation_day: CalendarDay,
    ) -> Vec<HabitStats> {
        let stats: Vec<HabitStats> = habits
            .iter()
            .map(|habit| habit_stats(habit, checkins, evaluation_day))
            .collect();
        debug!(%evaluation_day, habits = stats.len(), "computed habit stats");
        stats
    }

    /// Check-in counts for every day of an explicit range.
    ///
    /// Unlike the heatmap, the range is independent of the evaluation day.
    pub fn range_counts(
        &self,
        checkins: &[CheckinEvent],
        from: CalendarDay,
        to: CalendarDay,
    ) -> Result<Vec<DayCount>, ComputeError> {
        counts_in_range(CheckinIndex::build(checkins).counts_by_date(), from, to)
    }

    /// Parse store JSON, compute, and encode the snapshot as JSON
    pub fn process_json(
        &self,
        habits_json: &str,
        checkins_json: &str,
        evaluation_day: &str,
    ) -> Result<String, ComputeError> {
        let habits = StoreAdapter::parse_habits(habits_json)?;
        let checkins = StoreAdapter::parse_checkins(checkins_json)?;
        let day = parse_date_key(evaluation_day)?;

        let snapshot = self.compute(&habits, &checkins, day);
        serde_json::to_string_pretty(&snapshot).map_err(ComputeError::JsonError)
    }

    fn build_heatmap(&self, index: &CheckinIndex, evaluation_day: CalendarDay) -> HeatmapView {
        let grid = build_grid_with_window(
            index.counts_by_date(),
            evaluation_day,
            self.config.heatmap_days,
        );
        let month_labels = assign_labels(&grid, &self.config.names);
        let intensities = grid_intensities(&grid);

        HeatmapView {
            grid,
            month_labels,
            weekday_labels: self.config.names.weekdays.to_vec(),
            intensities,
        }
    }
}

/// Intensity per cell, column by column
fn grid_intensities(grid: &HeatmapGrid) -> Vec<[Intensity; DAYS_PER_WEEK]> {
    grid.weeks
        .iter()
        .map(|&week| week.map(|cell| Intensity::from_count(cell.count())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::RateMode;
    use crate::types::{HabitId, HeatmapCell};
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn today() -> CalendarDay {
        NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()
    }

    fn habit(id: u64, name: &str, streak: u32) -> HabitSummary {
        HabitSummary {
            id: HabitId::from(id),
            name: name.to_string(),
            description: Some(String::new()),
            current_streak: streak,
            created_at: None,
        }
    }

    fn checkin(habit: u64, days_ago: i64) -> CheckinEvent {
        CheckinEvent::new(habit, today() - Duration::days(days_ago))
    }

    fn sample_habits_json() -> &'static str {
        r#"[
            {"id": 1, "name": "Read", "description": "20 pages", "current_streak": 2},
            {"id": 2, "name": "Run", "description": "", "current_streak": 0}
        ]"#
    }

    fn sample_checkins_json() -> &'static str {
        r#"[
            {"id": 1, "habit": 1, "date": "2024-01-17"},
            {"id": 2, "habit": 1, "date": "2024-01-16"},
            {"id": 3, "habit": 2, "date": "2024-01-10"}
        ]"#
    }

    #[test]
    fn test_habits_to_dashboard() {
        let result = habits_to_dashboard(
            sample_habits_json().to_string(),
            sample_checkins_json().to_string(),
            "2024-01-17".to_string(),
        );

        assert!(result.is_ok());
        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();

        assert_eq!(payload["evaluation_day"], "2024-01-17");
        assert_eq!(payload["done_today_count"], 1);
        assert_eq!(payload["total_habits"], 2);
        assert_eq!(payload["all_done"], false);
        assert_eq!(payload["best_current_streak"], 2);
        assert_eq!(payload["all_time_total"], 3);
        // 3 / 60 = 5%
        assert_eq!(payload["monthly_rate"], 5);

        assert_eq!(payload["habits"][0]["done_today"], true);
        assert_eq!(payload["habits"][1]["done_today"], false);
        assert!(payload["habits"][1].get("description").is_none());

        let weeks = payload["heatmap"]["grid"]["weeks"].as_array().unwrap();
        assert_eq!(weeks.len(), payload["heatmap"]["month_labels"].as_array().unwrap().len());
        assert_eq!(payload["heatmap"]["weekday_labels"][0], "Mon");
    }

    #[test]
    fn test_bad_evaluation_day() {
        let result = habits_to_dashboard(
            sample_habits_json().to_string(),
            sample_checkins_json().to_string(),
            "17/01/2024".to_string(),
        );
        assert!(matches!(result, Err(ComputeError::InvalidDateKey(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = habits_to_dashboard(
            "not valid json".to_string(),
            "[]".to_string(),
            "2024-01-17".to_string(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_habits() {
        let snapshot = DashboardEngine::new().compute(&[], &[], today());

        assert_eq!(snapshot.total_habits, 0);
        assert_eq!(snapshot.monthly_rate, None);
        assert_eq!(snapshot.best_current_streak, 0);
        assert!(!snapshot.all_done);
        assert_eq!(snapshot.heatmap.grid.days().count(), 365);
    }

    #[test]
    fn test_duplicates_count_for_intensity_not_completion() {
        let habits = vec![habit(1, "Read", 1), habit(2, "Run", 1)];
        let checkins = vec![checkin(1, 0), checkin(1, 0), checkin(1, 0), checkin(2, 0)];

        let snapshot = DashboardEngine::new().compute(&habits, &checkins, today());

        assert_eq!(snapshot.done_today_count, 2);
        assert!(snapshot.all_done);

        let last = snapshot.heatmap.grid.weeks.last().unwrap();
        let intensities = snapshot.heatmap.intensities.last().unwrap();
        // Wednesday row
        assert_eq!(last[2].count(), 4);
        assert_eq!(intensities[2], Intensity::Medium);
        assert_eq!(intensities[3], Intensity::None);
    }

    #[test]
    fn test_rate_mode_from_config() {
        let habits = vec![habit(1, "Read", 0)];
        let checkins: Vec<CheckinEvent> = (0..30).flat_map(|d| [checkin(1, d), checkin(1, d)]).collect();

        let raw = DashboardEngine::new().compute(&habits, &checkins, today());
        assert_eq!(raw.monthly_rate, Some(200));

        let config = EngineConfig {
            rate_mode: RateMode::Distinct,
            ..EngineConfig::default()
        };
        let distinct = DashboardEngine::with_config(config).unwrap().compute(&habits, &checkins, today());
        assert_eq!(distinct.monthly_rate, Some(100));
    }

    #[test]
    fn test_custom_windows() {
        let config = EngineConfig {
            heatmap_days: 28,
            rolling_window_days: 7,
            ..EngineConfig::default()
        };
        let engine = DashboardEngine::with_config(config).unwrap();
        let habits = vec![habit(1, "Read", 0)];
        let checkins: Vec<CheckinEvent> = (0..7).map(|d| checkin(1, d)).collect();

        let snapshot = engine.compute(&habits, &checkins, today());
        assert_eq!(snapshot.monthly_rate, Some(100));
        assert_eq!(snapshot.rolling_window_days, 7);
        assert_eq!(snapshot.heatmap.grid.days().count(), 28);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            rolling_window_days: 0,
            ..EngineConfig::default()
        };
        assert!(DashboardEngine::with_config(config).is_err());
    }

    #[test]
    fn test_heatmap_only() {
        let checkins = vec![checkin(1, 400), checkin(1, 10)];
        let view = DashboardEngine::new().heatmap(&checkins, today());

        let total: u32 = view.grid.days().map(HeatmapCell::count).sum();
        assert_eq!(total, 1);
        assert_eq!(view.intensities.len(), view.grid.len());
    }

    #[test]
    fn test_orphan_checkins_do_not_count_as_done() {
        let habits = vec![habit(1, "Read", 0), habit(2, "Run", 0)];
        let checkins = vec![checkin(1, 0), checkin(7, 0), checkin(8, 0)];

        let snapshot = DashboardEngine::new().compute(&habits, &checkins, today());
        assert_eq!(snapshot.done_today_count, 1);
        assert!(!snapshot.all_done);
        // Still part of the heatmap and the totals
        assert_eq!(snapshot.all_time_total, 3);
        assert_eq!(snapshot.heatmap.grid.weeks.last().unwrap()[2].count(), 3);
    }

    #[test]
    fn test_stats_per_habit() {
        let habits = vec![habit(1, "Read", 4), habit(2, "Run", 0)];
        let checkins = vec![checkin(1, 3), checkin(1, 1), checkin(1, 0)];

        let stats = DashboardEngine::new().stats(&habits, &checkins, today());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].habit_id, HabitId::from(1u64));
        assert_eq!(stats[0].total_completed, 3);
        // First check-in 3 days ago: 4 days tracked
        assert_eq!(stats[0].days_tracked, 4);
        assert!((stats[0].completion_percentage - 75.0).abs() < 1e-9);
        assert_eq!(stats[0].current_streak, 4);
        assert_eq!(stats[1].total_completed, 0);
        assert_eq!(stats[1].completion_percentage, 0.0);
    }

    #[test]
    fn test_habits_to_stats_json() {
        let result = habits_to_stats(
            r#"[{"id": 1, "name": "Read", "created_at": "2024-01-08T09:00:00Z"}]"#.to_string(),
            sample_checkins_json().to_string(),
            "2024-01-17".to_string(),
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(payload[0]["habit_id"], 1);
        assert_eq!(payload[0]["total_completed"], 2);
        assert_eq!(payload[0]["days_tracked"], 10);
        assert_eq!(payload[0]["completion_percentage"], 20.0);
    }

    #[test]
    fn test_range_counts() {
        let checkins = vec![checkin(1, 0), checkin(2, 0), checkin(1, 2)];
        let counts = DashboardEngine::new()
            .range_counts(&checkins, today() - Duration::days(2), today())
            .unwrap();

        let values: Vec<u32> = counts.iter().map(|d| d.count).collect();
        assert_eq!(values, vec![1, 0, 2]);
        assert_eq!(counts[2].intensity, Intensity::Low);
    }

    #[test]
    fn test_range_counts_json_rejects_inverted_range() {
        let result = checkins_to_range_counts(
            sample_checkins_json().to_string(),
            "2024-01-17".to_string(),
            "2024-01-10".to_string(),
        );
        assert!(matches!(result, Err(ComputeError::InvalidRange(_))));

        let ok = checkins_to_range_counts(
            sample_checkins_json().to_string(),
            "2024-01-10".to_string(),
            "2024-01-17".to_string(),
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(payload.as_array().unwrap().len(), 8);
        assert_eq!(payload[0]["date"], "2024-01-10");
        assert_eq!(payload[0]["count"], 1);
        assert_eq!(payload[7]["intensity"], 1);
    }

    #[test]
    fn test_huge_window_rejected_before_compute() {
        let config = EngineConfig {
            rolling_window_days: 4_000_000_000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            DashboardEngine::with_config(config),
            Err(ComputeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_idempotent() {
        let habits = vec![habit(1, "Read", 3), habit(2, "Run", 0)];
        let checkins = vec![checkin(1, 0), checkin(2, 3), checkin(1, 100)];
        let engine = DashboardEngine::new();

        assert_eq!(
            engine.compute(&habits, &checkins, today()),
            engine.compute(&habits, &checkins, today())
        );
    }
}
