//! `dc-dashboard` library crate.
//!
//! The binary (`dcdash`) is a thin wrapper around this library so that:
//!
//! - the transform is testable without spawning processes
//! - the chart descriptions can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod transform;
pub mod tui;
