//! Request classification and strategy dispatch.

use std::sync::Arc;

use haven_core::{CacheRequest, CachedResponse};
use url::Url;

use crate::strategy::Strategy;

/// Raster image extensions routed to the bounded image store.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "avif", "gif"];

/// Which strategy class a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Page loads: network-first with the offline document as last resort.
    Navigation,
    /// Same-origin static assets: stale-while-revalidate.
    SameOriginAsset,
    /// Cross-origin raster images: cache-first in the bounded store.
    ThirdPartyImage,
    /// Everything else: network falling back to cache.
    Other,
}

/// Classify a request. First match wins; `None` means the request is
/// not intercepted at all (non-GET).
pub fn classify(request: &CacheRequest, page_origin: &Url) -> Option<RequestClass> {
    if !request.is_get() {
        return None;
    }

    if request.mode.as_deref() == Some("navigate")
        || request.accept.as_deref().is_some_and(|a| a.contains("text/html"))
    {
        return Some(RequestClass::Navigation);
    }

    if request.url.origin() == page_origin.origin() {
        return Some(RequestClass::SameOriginAsset);
    }

    if request.destination.as_deref() == Some("image") || has_image_extension(request.url.path()) {
        return Some(RequestClass::ThirdPartyImage);
    }

    Some(RequestClass::Other)
}

/// Case-insensitive extension check on the URL path; the query string
/// is not part of the path and never participates.
fn has_image_extension(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Dispatches each intercepted request to exactly one strategy.
pub struct Router {
    page_origin: Url,
    navigation: Arc<dyn Strategy>,
    asset: Arc<dyn Strategy>,
    image: Arc<dyn Strategy>,
    fallback: Arc<dyn Strategy>,
}

impl Router {
    pub fn new(
        page_origin: Url,
        navigation: Arc<dyn Strategy>,
        asset: Arc<dyn Strategy>,
        image: Arc<dyn Strategy>,
        fallback: Arc<dyn Strategy>,
    ) -> Self {
        Self { page_origin, navigation, asset, image, fallback }
    }

    /// Resolve a request, or `None` when it falls through to native
    /// handling (non-GET). No store is read or written in that case.
    pub async fn handle(&self, request: &CacheRequest) -> Option<CachedResponse> {
        let class = classify(request, &self.page_origin)?;
        tracing::debug!(url = %request.url, ?class, "dispatching request");
        let strategy = match class {
            RequestClass::Navigation => &self.navigation,
            RequestClass::SameOriginAsset => &self.asset,
            RequestClass::ThirdPartyImage => &self.image,
            RequestClass::Other => &self.fallback,
        };
        Some(strategy.handle(request).await)
    }
}
