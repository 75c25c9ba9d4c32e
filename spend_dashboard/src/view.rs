//! The snapshot handed to the presentation layer.

use serde::Serialize;
use spend_source::models::FilterSelection;

use crate::{
    kpi::{KpiSnapshot, compute_kpis},
    labels::LabelVisibility,
    scheduler::{DashboardStatus, RefreshScheduler, RefreshState},
    series::{MonthSeries, aggregate},
    view_mode::ViewMode,
};

/// Everything a renderer needs to draw the dashboard.
///
/// `series` and `kpis` are always derived from the scheduler's current
/// record list and `mode`; they are never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filters: FilterSelection,
    pub mode: ViewMode,
    pub status: DashboardStatus,
    pub series: MonthSeries,
    pub kpis: KpiSnapshot,
    /// Goal left over; negative once the goal is exceeded.
    pub goal_gap: f64,
    /// Share of the goal already spent, `None` without a goal.
    pub goal_ratio: Option<f64>,
    pub refresh: RefreshState,
    pub labels: LabelVisibility,
    /// Message of the last failed fetch, cleared by the next success.
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub running: bool,
}

impl DashboardView {
    pub fn derive(scheduler: &RefreshScheduler, mode: ViewMode, labels: LabelVisibility) -> Self {
        let records = scheduler.records();
        let kpis = compute_kpis(records, mode);
        Self {
            filters: scheduler.filters().clone(),
            mode,
            status: scheduler.status(),
            series: aggregate(records, mode),
            goal_gap: kpis.goal_gap(),
            goal_ratio: kpis.goal_ratio(),
            kpis,
            refresh: scheduler.refresh().clone(),
            labels,
            last_error: scheduler.last_error().map(str::to_string),
            consecutive_failures: scheduler.consecutive_failures(),
            running: scheduler.is_running(),
        }
    }

    /// A successful fetch for the current filters returned nothing.
    pub fn has_no_data(&self) -> bool {
        self.status == DashboardStatus::Empty
    }

    pub fn labels_visible(&self) -> bool {
        self.labels == LabelVisibility::Visible
    }
}
