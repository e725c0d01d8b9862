//! Output sinks for run reports.

pub mod csv;
pub mod json;
pub mod text;
