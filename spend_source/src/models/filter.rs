use std::fmt;

use serde::{Deserialize, Serialize};

/// The two keys that parameterize every dashboard fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Category identifier, e.g. `"Alimentação:Café da Manhã"`.
    pub category: String,
    /// Month/year label, e.g. `"Janeiro/2026"`.
    pub month_year: String,
}

impl FilterSelection {
    pub fn new(category: impl Into<String>, month_year: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            month_year: month_year.into(),
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.category, self.month_year)
    }
}
