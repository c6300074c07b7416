//! Degraded-response payloads.
//!
//! The offline document and placeholder image are content owned by the
//! page layer; the engine only synthesizes responses around whatever
//! bytes it is given. The built-in defaults keep the engine usable
//! before the page layer supplies real content.

use bytes::Bytes;
use haven_core::CachedResponse;

/// 1x1 transparent GIF.
const PLACEHOLDER_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

const DEFAULT_OFFLINE_HTML: &str = "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Offline</title></head>\n<body><h1>You are offline</h1><p>This page is not available without a network connection.</p></body>\n</html>\n";

/// Collaborator-supplied payloads for the worst-case responses.
#[derive(Debug, Clone)]
pub struct Fallbacks {
    offline_html: String,
    placeholder_image: Bytes,
    placeholder_mime: String,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            offline_html: DEFAULT_OFFLINE_HTML.to_string(),
            placeholder_image: Bytes::from_static(PLACEHOLDER_GIF),
            placeholder_mime: "image/gif".to_string(),
        }
    }
}

impl Fallbacks {
    pub fn with_offline_html(mut self, html: impl Into<String>) -> Self {
        self.offline_html = html.into();
        self
    }

    pub fn with_placeholder_image(mut self, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.placeholder_mime = mime.into();
        self.placeholder_image = bytes.into();
        self
    }

    /// The offline document served when a navigation cannot be
    /// satisfied from network or cache.
    pub fn offline_document(&self) -> CachedResponse {
        CachedResponse::synthetic(200, "text/html; charset=utf-8", self.offline_html.clone())
    }

    /// The placeholder served when an image fetch fails; images never
    /// hard-fail visibly.
    pub fn placeholder_image(&self) -> CachedResponse {
        CachedResponse::synthetic(200, &self.placeholder_mime, self.placeholder_image.clone())
    }
}
