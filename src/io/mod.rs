//! Input/output helpers.
//!
//! - workbook / CSV sheet reading (`sheet`)
//! - column selection + date normalization (`ingest`)
//! - JSON/CSV exports (`export`)

pub mod export;
pub mod ingest;
pub mod sheet;

pub use export::*;
pub use ingest::*;
pub use sheet::*;
