//! Heatmap intensity buckets
//!
//! Maps a day's check-in count onto one of five color levels:
//! `0 → 0`, `1–2 → 1`, `3–4 → 2`, `5–6 → 3`, `7+ → 4`.

use serde::{Deserialize, Serialize};

/// Five-level heatmap intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl Intensity {
    /// Bucket for a day's check-in count
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Intensity::None,
            1..=2 => Intensity::Low,
            3..=4 => Intensity::Medium,
            5..=6 => Intensity::High,
            _ => Intensity::Max,
        }
    }

    /// Ordinal level, 0 through 4
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Style token used by the presentation layer (`heat-0` … `heat-4`)
    pub fn token(self) -> &'static str {
        match self {
            Intensity::None => "heat-0",
            Intensity::Low => "heat-1",
            Intensity::Medium => "heat-2",
            Intensity::High => "heat-3",
            Intensity::Max => "heat-4",
        }
    }
}

impl From<Intensity> for u8 {
    fn from(intensity: Intensity) -> Self {
        intensity.level()
    }
}

impl TryFrom<u8> for Intensity {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Intensity::None),
            1 => Ok(Intensity::Low),
            2 => Ok(Intensity::Medium),
            3 => Ok(Intensity::High),
            4 => Ok(Intensity::Max),
            other => Err(format!("intensity level out of range: {other}")),
        }
    }
}

/// Intensity level (0–4) for a day's check-in count
pub fn bucket(count: u32) -> u8 {
    Intensity::from_count(count).level()
}
