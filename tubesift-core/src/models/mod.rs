//! Domain models for TubeSift.
//!
//! ## Submodules
//!
//! - [`url`] - URL classification (UrlKind, UrlEntry, id extraction)
//! - [`record`] - Canonical records (VideoRecord, RecordSource)
//! - [`outcome`] - Per-entry provenance and the run report

mod outcome;
mod record;
mod url;

// Re-export everything at the models level
pub use outcome::{EntryOutcome, EntryProvenance, RunReport};
pub use record::{RecordSource, VideoRecord};
pub use url::{channel_id, classify, handle, playlist_id, video_id, UrlEntry, UrlKind};
