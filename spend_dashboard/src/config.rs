//! Dashboard configuration: TOML model, defaults and validation.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock setup: the production API, a 60 s refresh, a 1 s countdown tick and
//! a 1.6 s label reveal delay.
//!
//! ```toml
//! [source]
//! base_url = "http://localhost:5000"
//!
//! [refresh]
//! interval_ms = 30000
//!
//! [filters]
//! category = "Transporte"
//! start_year = 2025
//!
//! [view]
//! mode = "weekly"
//! ```
//!
//! `SPEND_API_BASE_URL`, when set, overrides `source.base_url`.

use std::{path::Path, time::Duration};

use anyhow::{Context, bail};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use shared_utils::env::env_override;
use spend_source::source::http::{BASE_URL_ENV, DEFAULT_BASE_URL};

use crate::{engine::EngineSettings, view_mode::ViewMode};

/// Upper bound for any configured period (one day).
const MAX_PERIOD_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    pub source: SourceCfg,
    pub refresh: RefreshCfg,
    pub filters: FiltersCfg,
    pub view: ViewCfg,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SourceCfg {
    /// Scheme + host of the finance API.
    pub base_url: String,
    /// Per-list limit for the startup option requests.
    pub combo_timeout_ms: u64,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            combo_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RefreshCfg {
    /// Polling period, measured from fetch start to fetch start.
    pub interval_ms: u64,
    /// How often the countdown is recomputed.
    pub countdown_tick_ms: u64,
    /// Quiet time before value labels are shown again.
    pub label_reveal_delay_ms: u64,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            countdown_tick_ms: 1_000,
            label_reveal_delay_ms: 1_600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct FiltersCfg {
    /// Initial category; see [`crate::filters::initial_selection`] when unset.
    pub category: Option<String>,
    /// Initial month/year label.
    pub month_year: Option<String>,
    /// First year offered by the month/year selector.
    pub start_year: i32,
    /// Last year offered; the current year when unset.
    pub end_year: Option<i32>,
}

impl Default for FiltersCfg {
    fn default() -> Self {
        Self {
            category: None,
            month_year: None,
            start_year: 2025,
            end_year: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ViewCfg {
    pub mode: ViewMode,
}

impl DashboardConfig {
    /// Checks the ranges serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_period("refresh.interval_ms", self.refresh.interval_ms)?;
        check_period("refresh.countdown_tick_ms", self.refresh.countdown_tick_ms)?;
        check_period("source.combo_timeout_ms", self.source.combo_timeout_ms)?;
        if self.refresh.label_reveal_delay_ms > MAX_PERIOD_MS {
            bail!("refresh.label_reveal_delay_ms must be at most {MAX_PERIOD_MS}");
        }
        if self.source.base_url.trim().is_empty() {
            bail!("source.base_url must not be empty");
        }
        let end_year = self.end_year();
        if self.filters.start_year > end_year {
            bail!(
                "filters.start_year ({}) is after filters.end_year ({end_year})",
                self.filters.start_year
            );
        }
        Ok(())
    }

    /// Base URL after applying the `SPEND_API_BASE_URL` override.
    pub fn base_url(&self) -> String {
        env_override(BASE_URL_ENV).unwrap_or_else(|| self.source.base_url.clone())
    }

    pub fn end_year(&self) -> i32 {
        self.filters.end_year.unwrap_or_else(|| Local::now().year())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            interval: Duration::from_millis(self.refresh.interval_ms),
            countdown_tick: Duration::from_millis(self.refresh.countdown_tick_ms),
            label_reveal_delay: Duration::from_millis(self.refresh.label_reveal_delay_ms),
            from_year: self.filters.start_year,
            to_year: self.end_year(),
            combo_timeout: Duration::from_millis(self.source.combo_timeout_ms),
            category: self.filters.category.clone(),
            month_year: self.filters.month_year.clone(),
            mode: self.view.mode,
        }
    }
}

fn check_period(name: &str, ms: u64) -> anyhow::Result<()> {
    if ms == 0 {
        bail!("{name} must be > 0");
    }
    if ms > MAX_PERIOD_MS {
        bail!("{name} must be at most {MAX_PERIOD_MS}");
    }
    Ok(())
}

/// Parse + validate from a TOML string.
pub fn load_config_str(s: &str) -> anyhow::Result<DashboardConfig> {
    let cfg: DashboardConfig = toml::from_str(s).context("parsing dashboard config TOML")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse + validate from a file path.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<DashboardConfig> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading dashboard config {}", path.display()))?;
    load_config_str(&s).with_context(|| format!("loading dashboard config {}", path.display()))
}
