//! Request type shared across a handler chain

use crate::params::PathParams;
use bytes::Bytes;
use http::{request::Parts, HeaderMap, Uri, Version};
use hyper::upgrade::OnUpgrade;
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP request handed to middleware and handlers.
///
/// Cloning is cheap: every item in a chain observes the same underlying
/// request data for the duration of the dispatch.
#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    parts: Parts,
    body: Bytes,
    segments: Vec<String>,
    params: PathParams,
    /// One-shot slot for hyper's upgrade future; claimed by a websocket
    /// handler completing the handshake.
    upgrade: Mutex<Option<OnUpgrade>>,
}

impl Request {
    pub(crate) fn new(
        parts: Parts,
        body: Bytes,
        segments: Vec<String>,
        params: PathParams,
        upgrade: Option<OnUpgrade>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                parts,
                body,
                segments,
                params,
                upgrade: Mutex::new(upgrade),
            }),
        }
    }

    /// Get the wire-level HTTP method
    pub fn method(&self) -> &http::Method {
        &self.inner.parts.method
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        &self.inner.parts.uri
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        self.inner.parts.version
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.inner.parts.uri.path()
    }

    /// Get the query string
    pub fn query_string(&self) -> Option<&str> {
        self.inner.parts.uri.query()
    }

    /// Get the buffered request body
    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Path split on `/` with empty segments removed
    pub fn path_segments(&self) -> &[String] {
        &self.inner.segments
    }

    /// Parameters bound during route resolution
    pub fn params(&self) -> &PathParams {
        &self.inner.params
    }

    /// Look up a single bound parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner.params.get(name)
    }

    /// Take the hyper upgrade future, if this request arrived with the
    /// websocket upgrade marker. One-shot: the first caller wins.
    pub fn take_upgrade(&self) -> Option<OnUpgrade> {
        self.inner
            .upgrade
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.inner.parts.method)
            .field("uri", &self.inner.parts.uri)
            .field("version", &self.inner.parts.version)
            .finish()
    }
}
