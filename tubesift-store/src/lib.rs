// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # TubeSift Store
//!
//! Validator cache and configuration persistence for TubeSift.
//!
//! - [`validator_cache`] - ETag-style validator cache for authoritative
//!   fetches, persisted atomically as JSON
//! - [`config`] - Run configuration with serde defaults and validation
//! - [`persistence`] - Atomic JSON file helpers with secure permissions

pub mod config;
pub mod error;
pub mod persistence;
pub mod validator_cache;

pub use config::{OutputConfig, RunConfig, API_KEY_ENV};
pub use error::StoreError;
pub use persistence::{default_cache_path, default_config_dir, default_config_path};
pub use validator_cache::{ValidatorCache, ValidatorCacheEntry};
