//! Combo options (categories and month/year labels) and their shared snapshot.
//!
//! The options are fetched once at startup by [`load_combo_options`] and
//! published through an [`OptionsCache`]. Readers (filter validation, the
//! presentation layer) load an `Arc<ComboOptions>` snapshot with no locking;
//! the loader swaps in a new snapshot atomically.
//!
//! The cache starts out with empty lists. An empty list means "not loaded"
//! and puts no restriction on the matching filter key.

use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use serde::Serialize;
use spend_source::source::{SourceError, SpendSource};
use tokio::time::{error::Elapsed, timeout};

/// How long each option list may take before it is given up on.
pub const DEFAULT_COMBO_TIMEOUT: Duration = Duration::from_secs(10);

/// Values offered by the two filter selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboOptions {
    pub categories: Vec<String>,
    pub month_years: Vec<String>,
}

/// Fetches both option lists concurrently.
///
/// Each list fails independently: a failed or timed-out fetch is logged and
/// leaves that list empty, the other one is still used. The call returns after
/// at most `limit`.
pub async fn load_combo_options(
    source: &dyn SpendSource,
    from_year: i32,
    to_year: i32,
    limit: Duration,
) -> ComboOptions {
    let (categories, month_years) = tokio::join!(
        timeout(limit, source.list_categories()),
        timeout(limit, source.list_month_years(from_year, to_year))
    );

    let categories = settle("categories", categories, limit);
    let month_years = settle("month_years", month_years, limit);

    tracing::info!(
        categories = categories.len(),
        month_years = month_years.len(),
        from_year,
        to_year,
        "combo options loaded"
    );
    ComboOptions {
        categories,
        month_years,
    }
}

fn settle(
    list: &'static str,
    outcome: Result<Result<Vec<String>, SourceError>, Elapsed>,
    limit: Duration,
) -> Vec<String> {
    match outcome {
        Ok(Ok(values)) => values,
        Ok(Err(e)) => {
            tracing::warn!(list, error = %e, "failed to load combo options");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(list, timeout = ?limit, "combo options request timed out");
            Vec::new()
        }
    }
}

/// Shared, lock-free snapshot of the loaded [`ComboOptions`].
#[derive(Clone)]
pub struct OptionsCache {
    inner: Arc<ArcSwap<ComboOptions>>,
}

impl OptionsCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ComboOptions::default())),
        }
    }

    /// Atomically replaces the snapshot. Readers see either the old or new one.
    pub fn store(&self, options: ComboOptions) {
        self.inner.store(Arc::new(options));
    }

    /// Returns an `Arc` snapshot.
    pub fn snapshot(&self) -> Arc<ComboOptions> {
        self.inner.load_full()
    }

    /// `true` if `category` may be selected.
    pub fn allows_category(&self, category: &str) -> bool {
        let snap = self.inner.load();
        snap.categories.is_empty() || snap.categories.iter().any(|c| c == category)
    }

    /// `true` if `month_year` may be selected.
    pub fn allows_month_year(&self, month_year: &str) -> bool {
        let snap = self.inner.load();
        snap.month_years.is_empty() || snap.month_years.iter().any(|m| m == month_year)
    }
}

impl Default for OptionsCache {
    fn default() -> Self {
        Self::new()
    }
}
