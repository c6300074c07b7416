//! Cache-strategy engine for haven.
//!
//! This crate provides the request interception layer on top of
//! `haven-core`'s stores:
//! - a `Fetcher` transport seam with a reqwest implementation
//! - the four caching strategies
//! - the request router
//! - the generation lifecycle manager
//! - detached background maintenance (trimming, revalidation)
//!
//! [`Interceptor`] wires all of it together from an `AppConfig`.

pub mod fallback;
pub mod fetch;
pub mod lifecycle;
pub mod maintenance;
pub mod router;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use haven_core::{AppConfig, CacheDb, CacheRequest, CachedResponse, Error, GenerationNames, StoreKind};
use url::Url;

pub use fallback::Fallbacks;
pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
pub use lifecycle::{HostControl, LifecycleManager, LifecycleState, NoopControl, SKIP_WAITING};
pub use maintenance::Maintenance;
pub use router::{RequestClass, Router, classify};
pub use strategy::{CacheFirstCapped, NetworkFallback, NetworkFirst, StaleWhileRevalidate, Strategy};

/// The assembled cache engine: router, strategies, lifecycle, and
/// maintenance behind one facade.
pub struct Interceptor {
    router: Router,
    lifecycle: LifecycleManager,
    maintenance: Arc<Maintenance>,
    cache: CacheDb,
}

impl Interceptor {
    /// Open the configured database, build the HTTP fetch client, and
    /// wire up the engine.
    pub async fn new(config: &AppConfig, fallbacks: Fallbacks) -> Result<Self, Error> {
        let cache = CacheDb::open(&config.db_path).await?;
        let page_origin = parse_origin(&config.page_origin)?;
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(
            FetchConfig { user_agent: config.user_agent.clone(), timeout: config.timeout() },
            page_origin,
        )?);
        Self::from_parts(cache, fetcher, config, fallbacks, Arc::new(NoopControl))
    }

    /// Wire the engine from pre-built parts. Used by hosts that supply
    /// their own transport or client control, and by tests.
    pub fn from_parts(
        cache: CacheDb,
        fetcher: Arc<dyn Fetcher>,
        config: &AppConfig,
        fallbacks: Fallbacks,
        control: Arc<dyn HostControl>,
    ) -> Result<Self, Error> {
        let page_origin = parse_origin(&config.page_origin)?;
        let names = GenerationNames::new(&config.namespace, &config.version);
        let maintenance = Maintenance::new();
        let fallbacks = Arc::new(fallbacks);

        let precache = names.store(StoreKind::Precache);
        let runtime = names.store(StoreKind::Runtime);
        let image_store = names.store(StoreKind::RuntimeImage);
        // reads prefer the warmed precache copy, writes land in runtime
        let read_path = vec![precache, runtime.clone()];

        let navigation = Arc::new(NetworkFirst::new(
            cache.clone(),
            Arc::clone(&fetcher),
            read_path.clone(),
            runtime.clone(),
            Arc::clone(&fallbacks),
        ));
        let asset = Arc::new(StaleWhileRevalidate::new(
            cache.clone(),
            Arc::clone(&fetcher),
            read_path.clone(),
            runtime.clone(),
            Arc::clone(&maintenance),
        ));
        let image = Arc::new(CacheFirstCapped::new(
            cache.clone(),
            Arc::clone(&fetcher),
            image_store,
            config.max_image_entries,
            Arc::clone(&maintenance),
            Arc::clone(&fallbacks),
        ));
        let catch_all = Arc::new(NetworkFallback::new(
            cache.clone(),
            Arc::clone(&fetcher),
            read_path,
            runtime,
        ));

        let router = Router::new(page_origin.clone(), navigation, asset, image, catch_all);
        let lifecycle = LifecycleManager::new(
            cache.clone(),
            fetcher,
            names,
            page_origin,
            config.precache_routes.clone(),
            control,
        );

        Ok(Self { router, lifecycle, maintenance, cache })
    }

    /// Resolve an intercepted request to exactly one response, or
    /// `None` when the request falls through to native handling.
    pub async fn handle(&self, request: &CacheRequest) -> Option<CachedResponse> {
        self.router.handle(request).await
    }

    /// Install-time warm of the precache store.
    pub async fn install(&self) -> Result<(), Error> {
        self.lifecycle.install().await
    }

    /// Activation sweep of stale generations.
    pub async fn activate(&self) -> Result<usize, Error> {
        self.lifecycle.activate().await
    }

    /// Forward a control message from the host page.
    pub fn on_message(&self, raw: &str) -> bool {
        self.lifecycle.on_message(raw)
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    /// Await all detached maintenance (trims, revalidations). Intended
    /// for graceful shutdown.
    pub async fn drain(&self) {
        self.maintenance.drain().await;
    }
}

fn parse_origin(origin: &str) -> Result<Url, Error> {
    Url::parse(origin).map_err(|e| Error::InvalidUrl(format!("{origin}: {e}")))
}
