//! Response value type stored in and replayed from the cache.

use bytes::Bytes;

use crate::Error;

/// Whether a response body and status are readable by the caller.
///
/// Cross-origin responses are opaque: their contents cannot be
/// inspected, but they can still be stored and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response with readable status and body.
    Basic,
    /// Cross-origin response; stored and replayed without inspection.
    Opaque,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Opaque => "opaque",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "basic" => Ok(ResponseKind::Basic),
            "opaque" => Ok(ResponseKind::Opaque),
            other => Err(Error::CorruptEntry(format!("unknown response kind: {other}"))),
        }
    }
}

/// A response as held by the cache engine.
///
/// A response value stands for a single-use body stream: when one value
/// must feed two consumers (the cache store and the caller), call
/// [`CachedResponse::duplicate`] first and hand each consumer its own
/// copy. `Clone` is deliberately not derived so that duplication stays
/// an explicit, visible operation at those call sites.
#[derive(Debug, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub kind: ResponseKind,
    /// Header pairs in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, kind: ResponseKind) -> Self {
        Self { status, kind, headers: Vec::new(), body: Bytes::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Whether this response may be written to a cache store.
    ///
    /// Opaque responses are cacheable even though their status cannot
    /// be trusted; readable responses must carry a success status.
    pub fn is_usable(&self) -> bool {
        self.is_ok() || self.kind == ResponseKind::Opaque
    }

    /// Explicitly duplicate the response so that both the cache store
    /// and the caller can each consume a copy.
    pub fn duplicate(&self) -> Self {
        Self {
            status: self.status,
            kind: self.kind,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// First header value matching `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Build a synthesized same-origin response.
    pub fn synthetic(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(status, ResponseKind::Basic)
            .with_header("content-type", content_type)
            .with_body(body)
    }

    /// Empty 504 returned when neither cache nor network could satisfy
    /// a request.
    pub fn gateway_timeout() -> Self {
        Self::new(504, ResponseKind::Basic)
    }

    pub(crate) fn headers_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.headers).map_err(|e| Error::CorruptEntry(e.to_string()))
    }

    pub(crate) fn headers_from_json(json: &str) -> Result<Vec<(String, String)>, Error> {
        serde_json::from_str(json).map_err(|e| Error::CorruptEntry(e.to_string()))
    }
}
