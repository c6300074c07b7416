//! Network-first with offline fallback, for page navigations.

use std::sync::Arc;

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, CachedResponse};

use super::{Strategy, lookup_first, put_if_usable};
use crate::fallback::Fallbacks;
use crate::fetch::Fetcher;

/// Try the network; fall back to cache, then to the offline document.
///
/// A navigation never fails: the worst case is the configured offline
/// page.
pub struct NetworkFirst {
    cache: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    read_stores: Vec<String>,
    write_store: String,
    fallbacks: Arc<Fallbacks>,
}

impl NetworkFirst {
    pub fn new(
        cache: CacheDb,
        fetcher: Arc<dyn Fetcher>,
        read_stores: Vec<String>,
        write_store: String,
        fallbacks: Arc<Fallbacks>,
    ) -> Self {
        Self { cache, fetcher, read_stores, write_store, fallbacks }
    }
}

#[async_trait]
impl Strategy for NetworkFirst {
    async fn handle(&self, request: &CacheRequest) -> CachedResponse {
        match self.fetcher.fetch(request).await {
            Ok(live) => {
                put_if_usable(&self.cache, &self.write_store, request, &live).await;
                live
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "navigation fetch failed; falling back");
                match lookup_first(&self.cache, &self.read_stores, request).await {
                    Some(cached) => cached,
                    None => self.fallbacks.offline_document(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedFetcher, basic_ok};
    use bytes::Bytes;
    use url::Url;

    fn strategy(cache: CacheDb, fetcher: Arc<ScriptedFetcher>) -> NetworkFirst {
        NetworkFirst::new(
            cache,
            fetcher,
            vec!["precache".to_string(), "runtime".to_string()],
            "runtime".to_string(),
            Arc::new(Fallbacks::default().with_offline_html("<h1>offline shell</h1>")),
        )
    }

    fn navigate(url: &str) -> CacheRequest {
        CacheRequest::get(Url::parse(url).unwrap()).with_mode("navigate")
    }

    #[tokio::test]
    async fn test_network_success_returns_live_and_caches() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.route("https://example.com/about/", basic_ok("text/html", "<p>about</p>"));

        let request = navigate("https://example.com/about/");
        let response = strategy(cache.clone(), Arc::clone(&fetcher)).handle(&request).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from("<p>about</p>"));
        let stored = cache.lookup("runtime", &request).await.unwrap().unwrap();
        assert_eq!(stored.body, response.body);
    }

    #[tokio::test]
    async fn test_offline_serves_cached_copy() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = navigate("https://example.com/about/");
        cache
            .put("runtime", &request, basic_ok("text/html", "<p>cached about</p>"))
            .await
            .unwrap();
        fetcher.set_offline(true);

        let response = strategy(cache, fetcher).handle(&request).await;
        assert_eq!(response.body, Bytes::from("<p>cached about</p>"));
    }

    #[tokio::test]
    async fn test_offline_serves_precached_copy() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = navigate("https://example.com/");
        cache
            .put("precache", &request, basic_ok("text/html", "<p>warm shell</p>"))
            .await
            .unwrap();
        fetcher.set_offline(true);

        let response = strategy(cache, fetcher).handle(&request).await;
        assert_eq!(response.body, Bytes::from("<p>warm shell</p>"));
    }

    #[tokio::test]
    async fn test_offline_without_cache_serves_offline_document() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.set_offline(true);

        let request = navigate("https://example.com/never-seen/");
        let response = strategy(cache, fetcher).handle(&request).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
        assert_eq!(response.body, Bytes::from("<h1>offline shell</h1>"));
    }

    #[tokio::test]
    async fn test_error_status_returned_but_not_cached() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.route(
            "https://example.com/broken/",
            CachedResponse::synthetic(500, "text/html", "server error"),
        );

        let request = navigate("https://example.com/broken/");
        let response = strategy(cache.clone(), fetcher).handle(&request).await;

        assert_eq!(response.status, 500);
        assert!(cache.lookup("runtime", &request).await.unwrap().is_none());
    }
}
