//! Fetch layer for the spend dashboard.
//!
//! - [`models`]: the record model delivered by the finance API ([`models::SpendRecord`])
//!   and the filter keys every fetch is parameterized by.
//! - [`source`]: the [`source::SpendSource`] trait and its HTTP implementation.

pub mod models;
pub mod source;
