//! Habit Heat - Temporal aggregation engine for habit check-ins
//!
//! Habit Heat turns an unordered collection of habit check-ins into the views a
//! habit-tracking dashboard needs, through a deterministic pipeline:
//! check-in indexing → calendar grid → month labels → intensity buckets, with
//! the rolling completion rate computed alongside. Per-habit lifetime stats and
//! day counts over an explicit date range are available on their own.
//!
//! Every function takes the evaluation day explicitly and holds no state
//! between calls, so results are reproducible for any "today".

pub mod adapter;
pub mod config;
pub mod date_key;
pub mod error;
pub mod grid;
pub mod index;
pub mod intensity;
pub mod labels;
pub mod pipeline;
pub mod rate;
pub mod stats;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::StoreAdapter;
pub use config::EngineConfig;
pub use date_key::{date_key, parse_date_key, CalendarDay};
pub use error::ComputeError;
pub use grid::{build_grid, counts_in_range};
pub use index::CheckinIndex;
pub use intensity::{bucket, Intensity};
pub use labels::{assign_labels, NameTable};
pub use pipeline::{checkins_to_range_counts, habits_to_dashboard, habits_to_stats, DashboardEngine};
pub use rate::{distinct_rolling_rate, rolling_rate, RateMode};
pub use stats::habit_stats;
pub use types::{
    CheckinEvent, DashboardSnapshot, DayCount, HabitId, HabitStats, HabitSummary, HeatmapCell,
    HeatmapGrid, MonthLabelRow, WeekColumn,
};

/// Engine version embedded in CLI and FFI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "habit-heat";
