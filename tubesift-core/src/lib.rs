// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TubeSift` Core
//!
//! Core types, models, and merge logic for the `TubeSift` resolver.
//!
//! This crate provides the foundational abstractions used across all other
//! `TubeSift` crates, including:
//!
//! - URL classification (single video vs. channel vs. playlist)
//! - The canonical [`VideoRecord`] schema and its merge law
//! - Per-entry provenance and the run report
//! - Error types
//!
//! ## Key Types
//!
//! - [`UrlKind`] / [`UrlEntry`] - classified input URLs
//! - [`VideoRecord`] / [`RecordSource`] - canonical records with source
//!   priority (API > scraper fallback > single-video fast path)
//! - [`RecordMerger`] - dedup by video id with field-level backfill
//! - [`RunReport`] / [`EntryProvenance`] - what happened to every entry

pub mod error;
pub mod merge;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    channel_id,
    classify,
    handle,
    playlist_id,
    video_id,
    EntryOutcome,
    EntryProvenance,
    RecordSource,
    RunReport,
    UrlEntry,
    UrlKind,
    VideoRecord,
};

// Re-export the merger
pub use merge::RecordMerger;
