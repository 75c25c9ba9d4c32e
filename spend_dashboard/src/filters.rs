//! Filter state: the category and month/year every fetch is parameterized by.

use spend_source::models::FilterSelection;
use thiserror::Error;

use crate::combo::{ComboOptions, OptionsCache};

/// Category selected when nothing is configured and the API offers it.
pub const DEFAULT_CATEGORY: &str = "Alimentação:Café da Manhã";
/// Month/year selected when nothing is configured and the API offers it.
pub const DEFAULT_MONTH_YEAR: &str = "Janeiro/2026";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unknown month/year: {0}")]
    UnknownMonthYear(String),
}

/// Owner of the current [`FilterSelection`].
///
/// Selections are checked against the loaded combo options; the `select_*`
/// methods return whether the selection actually changed.
pub struct FilterState {
    selection: FilterSelection,
    options: OptionsCache,
}

impl FilterState {
    pub fn new(selection: FilterSelection, options: OptionsCache) -> Self {
        Self { selection, options }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn select_category(&mut self, category: impl Into<String>) -> Result<bool, FilterError> {
        let candidate = FilterSelection {
            category: category.into(),
            month_year: self.selection.month_year.clone(),
        };
        self.select(candidate)
    }

    pub fn select_month_year(
        &mut self,
        month_year: impl Into<String>,
    ) -> Result<bool, FilterError> {
        let candidate = FilterSelection {
            category: self.selection.category.clone(),
            month_year: month_year.into(),
        };
        self.select(candidate)
    }

    /// Replaces both keys at once.
    pub fn select(&mut self, candidate: FilterSelection) -> Result<bool, FilterError> {
        self.validate(&candidate)?;
        if candidate == self.selection {
            return Ok(false);
        }
        self.selection = candidate;
        Ok(true)
    }

    pub fn validate(&self, candidate: &FilterSelection) -> Result<(), FilterError> {
        if !self.options.allows_category(&candidate.category) {
            return Err(FilterError::UnknownCategory(candidate.category.clone()));
        }
        if !self.options.allows_month_year(&candidate.month_year) {
            return Err(FilterError::UnknownMonthYear(candidate.month_year.clone()));
        }
        Ok(())
    }
}

/// Chooses the startup selection.
///
/// Explicitly configured values win. Otherwise the built-in defaults are used
/// when the API offers them (or offered nothing), and the first offered value
/// when it does not.
pub fn initial_selection(
    category: Option<&str>,
    month_year: Option<&str>,
    options: &ComboOptions,
) -> FilterSelection {
    FilterSelection::new(
        pick(category, DEFAULT_CATEGORY, &options.categories),
        pick(month_year, DEFAULT_MONTH_YEAR, &options.month_years),
    )
}

fn pick(configured: Option<&str>, fallback: &str, offered: &[String]) -> String {
    if let Some(value) = configured {
        return value.to_string();
    }
    if offered.is_empty() || offered.iter().any(|o| o == fallback) {
        return fallback.to_string();
    }
    offered[0].clone()
}
