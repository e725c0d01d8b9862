//! Host APIs for TubeSift provider adapters.
//!
//! This module provides abstractions for interacting with external systems:
//!
//! - [`http`] - HTTP client with tracing and per-proxy connection pools
//! - [`process`] - Subprocess execution for extractor tools

pub mod http;
pub mod process;

// Re-export key types
pub use http::{HttpClient, ResponseExt};
pub use process::{ProcessOutput, ProcessRunner};
