//! Data source abstraction for the spend dashboard.
//!
//! This module defines the [`SpendSource`] trait, the single interface the
//! dashboard engine uses to reach the remote finance API: the category list,
//! the month/year list, and the per-day spend records for one filter
//! selection.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`Arc<dyn SpendSource>`) so the engine can be driven by the HTTP source in
//! production and by an in-memory fake in tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use spend_source::models::{FilterSelection, SpendRecord};
//! use spend_source::source::{SourceError, SpendSource};
//!
//! struct EmptySource;
//!
//! #[async_trait]
//! impl SpendSource for EmptySource {
//!     async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
//!         Ok(vec![])
//!     }
//!
//!     async fn list_month_years(&self, _from: i32, _to: i32) -> Result<Vec<String>, SourceError> {
//!         Ok(vec![])
//!     }
//!
//!     async fn fetch_dashboard(
//!         &self,
//!         _filters: &FilterSelection,
//!     ) -> Result<Vec<SpendRecord>, SourceError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod http;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{FilterSelection, SpendRecord};

/// Trait for fetching dashboard data from the remote finance API.
#[async_trait]
pub trait SpendSource: Send + Sync {
    /// Lists the enabled category identifiers (e.g. `"Alimentação:Café da Manhã"`).
    async fn list_categories(&self) -> Result<Vec<String>, SourceError>;

    /// Lists the month/year labels (e.g. `"Janeiro/2026"`) between two years, inclusive.
    async fn list_month_years(&self, from_year: i32, to_year: i32)
    -> Result<Vec<String>, SourceError>;

    /// Fetches the per-day spend records for one category and month/year.
    ///
    /// The result must reflect both filter keys.
    async fn fetch_dashboard(
        &self,
        filters: &FilterSelection,
    ) -> Result<Vec<SpendRecord>, SourceError>;
}

/// Errors that can occur during the creation of a source instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured base URL does not parse.
    #[snafu(display("Invalid base URL {base_url:?}: {reason}"))]
    InvalidBaseUrl {
        base_url: String,
        reason: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `SpendSource` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceError {
    /// An error during an API request (e.g., network failure, connection reset).
    #[snafu(display("API request to {endpoint} failed: {source}"))]
    Reqwest {
        endpoint: &'static str,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-success status.
    #[snafu(display("API error from {endpoint} ({status}): {message}"))]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The response body did not match the expected JSON shape.
    #[snafu(display("Could not decode response from {endpoint}: {source}"))]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A filter value cannot be carried in an HTTP header.
    #[snafu(display("Value {value:?} is not a valid {name} header"))]
    InvalidHeader {
        name: &'static str,
        value: String,
        backtrace: Backtrace,
    },
}
