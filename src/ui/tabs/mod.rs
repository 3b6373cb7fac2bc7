//! Tab-specific content rendering.

pub mod dashboard;
pub mod history;
pub mod summaries;
pub mod today;
