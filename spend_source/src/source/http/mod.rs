//! Source backed by the finance REST API.

pub mod client;
pub mod params;
pub mod response;

pub use client::{BASE_URL_ENV, DEFAULT_BASE_URL, HttpSpendSource};
