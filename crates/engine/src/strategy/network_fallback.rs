//! Network falling back to cache, the default for everything else.

use std::sync::Arc;

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, CachedResponse};

use super::{Strategy, lookup_first, put_if_usable};
use crate::fetch::Fetcher;

/// The simplest policy: network, then cache, then an empty 504. No
/// revalidation, no bounding.
pub struct NetworkFallback {
    cache: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    read_stores: Vec<String>,
    write_store: String,
}

impl NetworkFallback {
    pub fn new(cache: CacheDb, fetcher: Arc<dyn Fetcher>, read_stores: Vec<String>, write_store: String) -> Self {
        Self { cache, fetcher, read_stores, write_store }
    }
}

#[async_trait]
impl Strategy for NetworkFallback {
    async fn handle(&self, request: &CacheRequest) -> CachedResponse {
        match self.fetcher.fetch(request).await {
            Ok(live) => {
                put_if_usable(&self.cache, &self.write_store, request, &live).await;
                live
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "fetch failed; trying cache");
                match lookup_first(&self.cache, &self.read_stores, request).await {
                    Some(cached) => cached,
                    None => CachedResponse::gateway_timeout(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedFetcher, basic_ok, opaque};
    use bytes::Bytes;
    use url::Url;

    fn strategy(cache: CacheDb, fetcher: Arc<ScriptedFetcher>) -> NetworkFallback {
        NetworkFallback::new(
            cache,
            fetcher,
            vec!["precache".to_string(), "runtime".to_string()],
            "runtime".to_string(),
        )
    }

    fn req(url: &str) -> CacheRequest {
        CacheRequest::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_success_stores_and_returns() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = req("https://api.example/data.json");
        fetcher.route("https://api.example/data.json", opaque(b"{}"));

        let response = strategy(cache.clone(), fetcher).handle(&request).await;

        assert_eq!(response.body, Bytes::from_static(b"{}"));
        assert!(cache.lookup("runtime", &request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = req("https://api.example/data.json");
        cache
            .put("runtime", &request, basic_ok("application/json", "{\"cached\":true}"))
            .await
            .unwrap();
        fetcher.set_offline(true);

        let response = strategy(cache, fetcher).handle(&request).await;
        assert_eq!(response.body, Bytes::from("{\"cached\":true}"));
    }

    #[tokio::test]
    async fn test_failure_without_cache_yields_504() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.set_offline(true);

        let response = strategy(cache, fetcher).handle(&req("https://api.example/none")).await;
        assert_eq!(response.status, 504);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_not_cached() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let fetcher = ScriptedFetcher::new();
        let request = req("https://example.com/secret");
        fetcher.route(
            "https://example.com/secret",
            CachedResponse::synthetic(403, "text/plain", "forbidden"),
        );

        let response = strategy(cache.clone(), fetcher).handle(&request).await;

        assert_eq!(response.status, 403);
        assert!(cache.lookup("runtime", &request).await.unwrap().is_none());
    }
}
