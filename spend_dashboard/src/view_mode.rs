//! Daily vs weekly bucketing of the spend series.

use std::{fmt, str::FromStr};

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// How records are bucketed into series points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One point per day.
    #[default]
    Daily,
    /// One point per week number within a month.
    Weekly,
}

impl ViewMode {
    /// Number of periods used to extrapolate an average to a whole month.
    pub const fn periods_per_month(self) -> f64 {
        match self {
            ViewMode::Daily => 30.0,
            ViewMode::Weekly => 4.0,
        }
    }
}

/// Display/parse for CLI ergonomics (`daily`, `weekly`; Portuguese aliases accepted)
impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Daily => "daily",
            ViewMode::Weekly => "weekly",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "diario" | "diário" | "d" => Ok(ViewMode::Daily),
            "weekly" | "semanal" | "w" => Ok(ViewMode::Weekly),
            other => bail!("unknown view mode: {other}"),
        }
    }
}
