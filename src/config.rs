//! Engine configuration
//!
//! Window lengths, the rate counting mode, and the fixed name table. Defaults
//! reproduce the stock dashboard: a 365-day heatmap and a 30-day rate.

use crate::error::ComputeError;
use crate::grid::{DEFAULT_HEATMAP_DAYS, MAX_WINDOW_DAYS};
use crate::labels::NameTable;
use crate::rate::{RateMode, DEFAULT_ROLLING_WINDOW_DAYS};
use serde::{Deserialize, Serialize};

/// Settings shared by every derivation in a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days covered by the heatmap, ending on the evaluation day
    pub heatmap_days: u32,
    /// Days covered by the completion rate, ending on the evaluation day
    pub rolling_window_days: u32,
    pub rate_mode: RateMode,
    pub names: NameTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heatmap_days: DEFAULT_HEATMAP_DAYS,
            rolling_window_days: DEFAULT_ROLLING_WINDOW_DAYS,
            rate_mode: RateMode::default(),
            names: NameTable::english(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine treats as contract violations
    pub fn validate(&self) -> Result<(), ComputeError> {
        check_window("heatmap_days", self.heatmap_days)?;
        check_window("rolling_window_days", self.rolling_window_days)
    }

    /// Load and validate a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

fn check_window(field: &str, days: u32) -> Result<(), ComputeError> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(ComputeError::ConfigError(format!(
            "{} must be between 1 and {}, got {}",
            field, MAX_WINDOW_DAYS, days
        )));
    }
    Ok(())
}
