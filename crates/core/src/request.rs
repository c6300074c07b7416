//! Request value type used for classification and cache keying.

use url::Url;

/// An intercepted outbound request.
///
/// Cache keying uses method + URL only; the remaining fields are
/// classification hints supplied by the host runtime and are not part
/// of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    /// HTTP method, uppercase (e.g. "GET").
    pub method: String,
    /// Absolute request URL.
    pub url: Url,
    /// Semantic destination hint (e.g. "image", "document").
    pub destination: Option<String>,
    /// Accept header value, if the host exposes it.
    pub accept: Option<String>,
    /// Request mode (e.g. "navigate" for page loads).
    pub mode: Option<String>,
}

impl CacheRequest {
    /// Create a request with an explicit method.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
            destination: None,
            accept: None,
            mode: None,
        }
    }

    /// Create a GET request, the only method the engine intercepts.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Origin of the request URL in ascii form (scheme://host:port).
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}
