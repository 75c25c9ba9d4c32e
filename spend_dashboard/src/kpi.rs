//! Summary KPIs for the spend cards.
//!
//! Pure and recomputed from scratch on every call.

use serde::Serialize;
use spend_source::models::SpendRecord;

use crate::view_mode::ViewMode;

/// Days in a week, used to turn a day count into a week count.
const DAYS_PER_WEEK: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// Sum of the amount spent.
    pub total: f64,
    /// Average per day (daily) or per week (weekly).
    pub average: f64,
    /// Average extrapolated to a 30-day / 4-week month.
    pub projection: f64,
    /// Sum of the spending goals.
    pub goal_total: f64,
}

impl KpiSnapshot {
    /// Goal left over (negative when the goal was exceeded).
    pub fn goal_gap(&self) -> f64 {
        self.goal_total - self.total
    }

    /// Fraction of the goal already spent. `None` without a goal.
    pub fn goal_ratio(&self) -> Option<f64> {
        (self.goal_total != 0.0).then(|| self.total / self.goal_total)
    }
}

/// Computes total, average, projection and goal total for `records`.
///
/// The divisor is the record count in daily mode and `count / 7` in weekly
/// mode, never below 1 so that fewer than seven days still average over one
/// week.
pub fn compute_kpis(records: &[SpendRecord], mode: ViewMode) -> KpiSnapshot {
    if records.is_empty() {
        return KpiSnapshot::default();
    }

    let total: f64 = records.iter().map(|r| r.value_spent.value()).sum();
    let goal_total: f64 = records.iter().map(|r| r.target_value.value()).sum();

    let count = records.len() as f64;
    let divisor = match mode {
        ViewMode::Daily => count,
        ViewMode::Weekly => (count / DAYS_PER_WEEK).max(1.0),
    };
    let average = total / divisor;

    KpiSnapshot {
        total,
        average,
        projection: average * mode.periods_per_month(),
        goal_total,
    }
}
