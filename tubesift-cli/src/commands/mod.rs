//! CLI command implementations.

pub mod cache;
pub mod classify;
pub mod resolve;
