//! Versioned generation lifecycle: install-time warm and
//! activation-time sweep.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use haven_core::{CacheDb, CacheRequest, Error, GenerationNames, StoreKind};
use url::Url;

/// Message type marker that forces immediate generation cutover.
pub const SKIP_WAITING: &str = "SKIP_WAITING";

/// Lifecycle states of a generation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Installed,
    Activating,
    Active,
}

/// Host-runtime hooks the lifecycle calls at cutover.
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Take control of currently open client contexts so the new
    /// generation applies without a full reload.
    async fn claim(&self);
}

/// Default no-op control for hosts without client contexts.
pub struct NoopControl;

#[async_trait]
impl HostControl for NoopControl {
    async fn claim(&self) {}
}

/// Owns store naming for the current version and runs the two fixed
/// lifecycle points: install (precache warm) and activate (stale
/// generation sweep + claim).
pub struct LifecycleManager {
    cache: CacheDb,
    fetcher: Arc<dyn crate::fetch::Fetcher>,
    names: GenerationNames,
    page_origin: Url,
    precache_routes: Vec<String>,
    control: Arc<dyn HostControl>,
    state: Mutex<LifecycleState>,
    skip_waiting: AtomicBool,
}

impl LifecycleManager {
    pub fn new(
        cache: CacheDb,
        fetcher: Arc<dyn crate::fetch::Fetcher>,
        names: GenerationNames,
        page_origin: Url,
        precache_routes: Vec<String>,
        control: Arc<dyn HostControl>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            names,
            page_origin,
            precache_routes,
            control,
            state: Mutex::new(LifecycleState::Installing),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn names(&self) -> &GenerationNames {
        &self.names
    }

    /// Whether the host asked for immediate cutover.
    pub fn skip_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    /// Handle a control message from the host page.
    ///
    /// Returns true when the message was recognized. A `SKIP_WAITING`
    /// message marks the generation for immediate cutover; the host
    /// checks [`LifecycleManager::skip_requested`] and calls
    /// [`LifecycleManager::activate`] without waiting for existing
    /// sessions to end.
    pub fn on_message(&self, raw: &str) -> bool {
        let parsed: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return false,
        };
        if parsed.get("type").and_then(|t| t.as_str()) == Some(SKIP_WAITING) {
            tracing::info!(version = self.names.version(), "skip-waiting requested");
            self.skip_waiting.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Warm the precache store with the configured core routes.
    ///
    /// Individual route failures are logged and skipped; the install
    /// transition completes regardless of how many routes warmed.
    pub async fn install(&self) -> Result<(), Error> {
        self.set_state(LifecycleState::Installing);
        let store = self.names.store(StoreKind::Precache);
        let mut warmed = 0usize;

        for route in &self.precache_routes {
            let url = match self.page_origin.join(route) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(route, error = %e, "invalid precache route; skipping");
                    continue;
                }
            };
            let request = CacheRequest::get(url);
            match self.fetcher.fetch(&request).await {
                Ok(response) if response.is_usable() => {
                    match self.cache.put(&store, &request, response).await {
                        Ok(()) => warmed += 1,
                        Err(e) => tracing::warn!(route, error = %e, "failed to store precache entry"),
                    }
                }
                Ok(response) => {
                    tracing::warn!(route, status = response.status, "precache fetch unusable; skipping");
                }
                Err(e) => {
                    tracing::warn!(route, error = %e, "precache fetch failed; skipping");
                }
            }
        }

        tracing::info!(
            store = %store,
            warmed,
            total = self.precache_routes.len(),
            "install complete"
        );
        self.set_state(LifecycleState::Installed);
        Ok(())
    }

    /// Sweep stale generations and claim open clients.
    ///
    /// Deletes every store namespaced under this engine whose name does
    /// not belong to the current generation, then hands control of open
    /// client contexts to this generation. Returns the number of stores
    /// removed.
    pub async fn activate(&self) -> Result<usize, Error> {
        self.set_state(LifecycleState::Activating);
        let mut removed = 0usize;

        for name in self.cache.list_store_names().await? {
            if self.names.is_stale(&name) {
                let entries = self.cache.delete_store(&name).await?;
                tracing::info!(store = %name, entries, "deleted stale generation store");
                removed += 1;
            }
        }

        self.control.claim().await;
        self.set_state(LifecycleState::Active);
        Ok(removed)
    }
}
