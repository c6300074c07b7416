//! Cache-first with an entry cap, for third-party image stores.

use std::sync::Arc;

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, CachedResponse};

use super::{Strategy, lookup_first, put_if_usable};
use crate::fallback::Fallbacks;
use crate::fetch::Fetcher;
use crate::maintenance::Maintenance;

/// Serve from cache without touching the network; on a miss, fetch,
/// store, and trim the store back under its cap in the background.
///
/// An image request never hard-fails: a transport failure on a miss
/// degrades to the placeholder image.
pub struct CacheFirstCapped {
    cache: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    store: String,
    max_entries: usize,
    maintenance: Arc<Maintenance>,
    fallbacks: Arc<Fallbacks>,
}

impl CacheFirstCapped {
    pub fn new(
        cache: CacheDb,
        fetcher: Arc<dyn Fetcher>,
        store: String,
        max_entries: usize,
        maintenance: Arc<Maintenance>,
        fallbacks: Arc<Fallbacks>,
    ) -> Self {
        Self { cache, fetcher, store, max_entries, maintenance, fallbacks }
    }
}

#[async_trait]
impl Strategy for CacheFirstCapped {
    async fn handle(&self, request: &CacheRequest) -> CachedResponse {
        let read_path = [self.store.clone()];
        if let Some(hit) = lookup_first(&self.cache, &read_path, request).await {
            return hit;
        }

        match self.fetcher.fetch(request).await {
            Ok(live) => {
                if live.is_usable() {
                    put_if_usable(&self.cache, &self.store, request, &live).await;
                    let cache = self.cache.clone();
                    let store = self.store.clone();
                    let max_entries = self.max_entries;
                    self.maintenance.spawn("trim", async move {
                        cache.trim(&store, max_entries).await.map(|_| ())
                    });
                }
                live
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "image fetch failed; serving placeholder");
                self.fallbacks.placeholder_image()
            }
        }
    }
}
