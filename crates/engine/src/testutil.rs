//! Scripted transport used by strategy, router, and lifecycle tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use haven_core::{CacheRequest, CachedResponse, Error, ResponseKind};

use crate::fetch::Fetcher;

/// A `Fetcher` that serves canned responses by URL and can simulate
/// going offline.
pub(crate) struct ScriptedFetcher {
    routes: Mutex<HashMap<String, CachedResponse>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn route(&self, url: &str, response: CachedResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::FetchFailed("offline".to_string()));
        }
        self.routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .map(CachedResponse::duplicate)
            .ok_or_else(|| Error::FetchFailed(format!("no scripted route for {}", request.url)))
    }
}

pub(crate) fn basic_ok(content_type: &str, body: &str) -> CachedResponse {
    CachedResponse::synthetic(200, content_type, body.to_string())
}

pub(crate) fn opaque(body: &[u8]) -> CachedResponse {
    CachedResponse::new(0, ResponseKind::Opaque).with_body(body.to_vec())
}
