//! The four request-handling strategies.
//!
//! Every strategy resolves to exactly one response; network and cache
//! failures are absorbed into degraded responses and never surface to
//! the caller. Reads walk the generation's read path (precache store
//! first, then runtime); writes always target the strategy's own write
//! store.

mod cache_first;
mod network_fallback;
mod network_first;
mod stale_while_revalidate;

pub use cache_first::CacheFirstCapped;
pub use network_fallback::NetworkFallback;
pub use network_first::NetworkFirst;
pub use stale_while_revalidate::StaleWhileRevalidate;

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, CachedResponse};

/// A request-handling policy.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Resolve a request to a response. Infallible by contract: the
    /// worst case is a synthesized degraded response.
    async fn handle(&self, request: &CacheRequest) -> CachedResponse;
}

/// Store a copy of a usable response.
///
/// Store failures are logged and swallowed: a cache problem must never
/// turn a good network response into an error.
pub(crate) async fn put_if_usable(cache: &CacheDb, store: &str, request: &CacheRequest, response: &CachedResponse) {
    if !response.is_usable() {
        return;
    }
    if let Err(e) = cache.put(store, request, response.duplicate()).await {
        tracing::warn!(store, url = %request.url, error = %e, "failed to cache response copy");
    }
}

/// First hit across the read path, treating store failures as misses.
pub(crate) async fn lookup_first(cache: &CacheDb, stores: &[String], request: &CacheRequest) -> Option<CachedResponse> {
    for store in stores {
        match cache.lookup(store, request).await {
            Ok(Some(hit)) => return Some(hit),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(store, url = %request.url, error = %e, "cache lookup failed; treating as miss");
            }
        }
    }
    None
}
