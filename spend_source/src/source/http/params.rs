//! Request construction for the finance API endpoints.

use reqwest::header::HeaderValue;

use crate::source::{InvalidHeaderSnafu, SourceError};

pub const CATEGORIES_PATH: &str = "/v1/category/search";
pub const MONTH_YEARS_PATH: &str = "/v1/date/month-year-all";
pub const DASHBOARD_PATH: &str = "/v1/dashboard/billToPay-day-week-category";

/// Header carrying the first year of the month/year listing.
pub const START_YEAR_HEADER: &str = "startYear";
/// Header carrying the month/year filter of a dashboard request.
pub const MONTH_YEAR_HEADER: &str = "mesAno";

/// Joins the base URL and an endpoint path without doubling the slash.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub fn categories_query() -> Vec<(&'static str, String)> {
    vec![("enable", "true".to_string())]
}

pub fn month_years_query(to_year: i32) -> Vec<(&'static str, String)> {
    vec![("endYear", to_year.to_string())]
}

pub fn dashboard_query(category: &str) -> Vec<(&'static str, String)> {
    vec![("categoria", category.to_string())]
}

/// Encodes a header value as ISO-8859-1 bytes.
///
/// Month labels such as `"Março/2026"` are not plain ASCII; the API expects
/// them the way a browser sends them, one byte per Latin-1 character.
/// Characters outside Latin-1 and control characters are rejected.
pub fn latin1_header(name: &'static str, value: &str) -> Result<HeaderValue, SourceError> {
    let bytes: Option<Vec<u8>> = value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    bytes
        .and_then(|b| HeaderValue::from_bytes(&b).ok())
        .ok_or_else(|| {
            InvalidHeaderSnafu {
                name,
                value: value.to_string(),
            }
            .build()
        })
}
