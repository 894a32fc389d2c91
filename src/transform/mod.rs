//! The per-render transform: range filtering, label text, y-axis scaling.
//!
//! Everything here is pure and recomputed on every render cycle.

pub mod axis;
pub mod filter;
pub mod labels;

pub use axis::axis_range;
pub use filter::{filter_range, latest_date, latest_date_label};
pub use labels::{format_labels, format_value};
