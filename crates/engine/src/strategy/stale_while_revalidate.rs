//! Stale-while-revalidate, for same-origin static assets.

use std::sync::Arc;

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, CachedResponse};

use super::{Strategy, lookup_first, put_if_usable};
use crate::fetch::Fetcher;
use crate::maintenance::Maintenance;

/// Serve from cache when possible and refresh in the background.
///
/// A cache hit wins on presence alone; there is no freshness check.
/// The revalidation fetch runs detached so the cached copy is returned
/// without waiting on the network, and its result only populates the
/// cache for next time.
pub struct StaleWhileRevalidate {
    cache: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    read_stores: Vec<String>,
    write_store: String,
    maintenance: Arc<Maintenance>,
}

impl StaleWhileRevalidate {
    pub fn new(
        cache: CacheDb,
        fetcher: Arc<dyn Fetcher>,
        read_stores: Vec<String>,
        write_store: String,
        maintenance: Arc<Maintenance>,
    ) -> Self {
        Self { cache, fetcher, read_stores, write_store, maintenance }
    }
}

#[async_trait]
impl Strategy for StaleWhileRevalidate {
    async fn handle(&self, request: &CacheRequest) -> CachedResponse {
        match lookup_first(&self.cache, &self.read_stores, request).await {
            Some(cached) => {
                let cache = self.cache.clone();
                let fetcher = Arc::clone(&self.fetcher);
                let store = self.write_store.clone();
                let request = request.clone();
                self.maintenance.spawn("revalidate", async move {
                    let fresh = fetcher.fetch(&request).await?;
                    if fresh.is_usable() {
                        cache.put(&store, &request, fresh).await?;
                    }
                    Ok(())
                });
                cached
            }
            None => match self.fetcher.fetch(request).await {
                Ok(fresh) => {
                    put_if_usable(&self.cache, &self.write_store, request, &fresh).await;
                    fresh
                }
                Err(e) => {
                    tracing::debug!(url = %request.url, error = %e, "asset unavailable from cache and network");
                    CachedResponse::gateway_timeout()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedFetcher, basic_ok};
    use bytes::Bytes;
    use url::Url;

    fn strategy(
        cache: CacheDb,
        fetcher: Arc<ScriptedFetcher>,
        maintenance: Arc<Maintenance>,
    ) -> StaleWhileRevalidate {
        StaleWhileRevalidate::new(
            cache,
            fetcher,
            vec!["precache".to_string(), "runtime".to_string()],
            "runtime".to_string(),
            maintenance,
        )
    }

    fn asset(url: &str) -> CacheRequest {
        CacheRequest::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_hit_returns_cached_even_when_network_would_fail() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let maintenance = Maintenance::new();
        let request = asset("https://example.com/app.css");
        cache
            .put("runtime", &request, basic_ok("text/css", "body{}"))
            .await
            .unwrap();
        fetcher.set_offline(true);

        let response = strategy(cache, Arc::clone(&fetcher), Arc::clone(&maintenance))
            .handle(&request)
            .await;

        assert_eq!(response.body, Bytes::from("body{}"));
        // the detached revalidation failure must stay contained
        maintenance.drain().await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_triggers_background_refresh() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let maintenance = Maintenance::new();
        let request = asset("https://example.com/app.js");
        cache
            .put("runtime", &request, basic_ok("text/javascript", "old()"))
            .await
            .unwrap();
        fetcher.route("https://example.com/app.js", basic_ok("text/javascript", "new()"));

        let response = strategy(cache.clone(), fetcher, Arc::clone(&maintenance))
            .handle(&request)
            .await;
        assert_eq!(response.body, Bytes::from("old()"));

        maintenance.drain().await;
        let refreshed = cache.lookup("runtime", &request).await.unwrap().unwrap();
        assert_eq!(refreshed.body, Bytes::from("new()"));
    }

    #[tokio::test]
    async fn test_miss_fetches_stores_and_returns() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let maintenance = Maintenance::new();
        let request = asset("https://example.com/logo.svg");
        fetcher.route("https://example.com/logo.svg", basic_ok("image/svg+xml", "<svg/>"));

        let response = strategy(cache.clone(), fetcher, maintenance).handle(&request).await;

        assert_eq!(response.body, Bytes::from("<svg/>"));
        assert!(cache.lookup("runtime", &request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_miss_with_network_failure_yields_504() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.set_offline(true);

        let request = asset("https://example.com/missing.css");
        let response = strategy(cache, fetcher, Maintenance::new()).handle(&request).await;

        assert_eq!(response.status, 504);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_miss_with_error_status_returned_uncached() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = asset("https://example.com/gone.css");
        fetcher.route("https://example.com/gone.css", CachedResponse::synthetic(404, "text/plain", "gone"));

        let response = strategy(cache.clone(), fetcher, Maintenance::new()).handle(&request).await;

        assert_eq!(response.status, 404);
        assert!(cache.lookup("runtime", &request).await.unwrap().is_none());
    }
}
