// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # TubeSift Fetch
//!
//! Provider adapter infrastructure and host APIs for TubeSift.
//!
//! This crate provides the machinery for resolving video platform URLs
//! into metadata records. It includes:
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - HTTP client with tracing and per-proxy pools
//! - [`host::process`] - Subprocess execution for extractor tools
//!
//! ## Provider Chain
//!
//! Each URL kind is served by an ordered chain of adapters:
//!
//! - [`adapter::ProviderAdapter`] - Trait for provider implementations
//! - [`chain::ProviderChain`] - Executes adapters in order with retry
//! - [`context::FetchContext`] - Provides access to host APIs and run state
//! - [`proxy::ProxyRotator`] - Round-robin egress endpoint selection
//!
//! ## Example
//!
//! ```ignore
//! use tubesift_fetch::{FetchContext, ProviderChain};
//!
//! let ctx = FetchContext::builder().api_key("...").build();
//!
//! let chain = ProviderChain::with_adapters(vec![
//!     Arc::new(DataApiAdapter::new()),
//!     Arc::new(ScraperAdapter::new()),
//! ]);
//!
//! let outcome = chain.execute(&entry, &ctx, None).await;
//! ```

// Core modules
pub mod adapter;
pub mod chain;
pub mod context;
pub mod error;
pub mod host;
pub mod proxy;
pub mod retry;

// Re-export key types at crate root

// Errors
pub use error::{FailureClass, FetchError, HttpError, ProcessError};

// Host APIs
pub use host::{
    http::{HttpClient, ResponseExt},
    process::{ProcessOutput, ProcessRunner},
};

// Adapter & Chain
pub use adapter::{AdapterInfo, FetchPayload, ProviderAdapter};
pub use chain::{ChainOutcome, ChainSuccess, FetchAttempt, ProviderChain};
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use proxy::{ProxyEndpoint, ProxyRotator};
pub use retry::RetryPolicy;
