//! Refresh-and-aggregation engine for the spend dashboard.
//!
//! Pure building blocks:
//! - [`series`]: raw records → per-month daily/weekly series
//! - [`kpi`]: total, average, projection and goal total
//! - [`scheduler`]: refresh state machine with the request sequence guard
//! - [`labels`]: delayed value-label reveal
//! - [`countdown`]: countdown and clock formatting
//!
//! Runtime:
//! - [`engine`]: the tokio event loop and its [`engine::DashboardHandle`]
//! - [`combo`] / [`filters`]: selector options and filter state
//! - [`config`]: TOML configuration

pub mod clock;
pub mod combo;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod filters;
pub mod kpi;
pub mod labels;
pub mod scheduler;
pub mod series;
pub mod view;
pub mod view_mode;

pub use engine::{DashboardEngine, DashboardHandle, EngineError, EngineSettings};
pub use view::DashboardView;
pub use view_mode::ViewMode;
