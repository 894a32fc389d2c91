//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical field schema and rows (`Field`, `Record`, `Table`)
//! - transform parameters and outputs (`DateRange`, `LabelSpec`, `AxisRange`)
//! - the dashboard configuration table (`DashboardConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
