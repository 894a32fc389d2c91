//! Plain-text reporting for terminals and logs.

pub mod format;

pub use format::*;
