// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # TubeSift Providers
//!
//! Provider adapter implementations and the resolution orchestrator.
//!
//! Three adapters cover the provider surface:
//!
//! - [`data_api::DataApiAdapter`] - quota-metered Data API with validator
//!   (ETag) revalidation; authoritative for channels and playlists
//! - [`scraper::ScraperAdapter`] - `yt-dlp` fallback for every URL kind
//! - [`fastvideo::FastVideoAdapter`] - watch-page fast path for single
//!   videos
//!
//! [`registry::AdapterSet`] assembles them into per-kind chains, and
//! [`resolver::Resolver`] drives a batch of entries through those chains,
//! producing a merged [`tubesift_core::RunReport`].

pub mod data_api;
pub mod fastvideo;
pub mod registry;
pub mod resolver;
pub mod scraper;

pub use data_api::DataApiAdapter;
pub use fastvideo::FastVideoAdapter;
pub use registry::AdapterSet;
pub use resolver::Resolver;
pub use scraper::ScraperAdapter;
