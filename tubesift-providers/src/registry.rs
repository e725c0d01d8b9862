//! Adapter registry and per-kind chain construction.

use std::sync::Arc;
use tubesift_core::UrlKind;
use tubesift_fetch::{ProviderAdapter, ProviderChain};

use crate::data_api::DataApiAdapter;
use crate::fastvideo::FastVideoAdapter;
use crate::scraper::ScraperAdapter;

/// The set of adapters a resolver draws its chains from.
///
/// Held as trait objects so tests can swap in mocks without touching the
/// orchestrator.
#[derive(Clone)]
pub struct AdapterSet {
    /// Authoritative Data API adapter.
    pub data_api: Arc<dyn ProviderAdapter>,
    /// General-purpose scraper fallback.
    pub scraper: Arc<dyn ProviderAdapter>,
    /// Fast single-video watch-page adapter.
    pub fast_video: Arc<dyn ProviderAdapter>,
}

impl AdapterSet {
    /// The standard production adapters.
    pub fn standard() -> Self {
        Self {
            data_api: Arc::new(DataApiAdapter::new()),
            scraper: Arc::new(ScraperAdapter::new()),
            fast_video: Arc::new(FastVideoAdapter::new()),
        }
    }

    /// Builds the adapter chain for a URL kind.
    ///
    /// - Single videos: fast path first, scraper fallback.
    /// - Channels and playlists: Data API first when enabled, scraper
    ///   fallback either way.
    /// - Unknown: an empty chain; the resolver fails these before
    ///   reaching it.
    pub fn chain_for(&self, kind: UrlKind, use_api: bool) -> ProviderChain {
        match kind {
            UrlKind::SingleVideo => {
                ProviderChain::with_adapters(vec![self.fast_video.clone(), self.scraper.clone()])
            }
            UrlKind::Channel | UrlKind::Playlist => {
                let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::with_capacity(2);
                if use_api {
                    adapters.push(self.data_api.clone());
                }
                adapters.push(self.scraper.clone());
                ProviderChain::with_adapters(adapters)
            }
            UrlKind::Unknown => ProviderChain::new(),
        }
    }
}

impl Default for AdapterSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_shapes() {
        let set = AdapterSet::standard();

        assert_eq!(set.chain_for(UrlKind::SingleVideo, true).len(), 2);
        assert_eq!(set.chain_for(UrlKind::Channel, true).len(), 2);
        assert_eq!(set.chain_for(UrlKind::Channel, false).len(), 1);
        assert_eq!(set.chain_for(UrlKind::Playlist, false).len(), 1);
        assert!(set.chain_for(UrlKind::Unknown, true).is_empty());
    }
}
