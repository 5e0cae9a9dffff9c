//! Routing methods

use http::HeaderMap;
use std::fmt;

/// Methods a route can be registered under.
///
/// `WebSocket` is a routing method of its own: upgrade requests are matched
/// against a separate tree and middleware stack even though they arrive as
/// GET on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP OPTIONS
    Options,
    /// HTTP HEAD
    Head,
    /// WebSocket upgrade handshake
    WebSocket,
}

impl Method {
    /// Map an incoming request onto a routing method.
    ///
    /// A GET carrying the websocket upgrade marker becomes
    /// [`Method::WebSocket`]. Returns `None` for wire methods the framework
    /// does not route (PATCH, TRACE, ...); the dispatcher rejects those with
    /// a 404 before any tree lookup.
    pub fn from_request(method: &http::Method, headers: &HeaderMap) -> Option<Self> {
        if *method == http::Method::GET && is_websocket_upgrade(headers) {
            return Some(Self::WebSocket);
        }
        match method.as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "OPTIONS" => Some(Self::Options),
            "HEAD" => Some(Self::Head),
            _ => None,
        }
    }

    /// Method name as registered, uppercase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::WebSocket => "WEBSOCKET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check the protocol-upgrade marker: `Connection: Upgrade` together with
/// `Upgrade: websocket`.
fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    let upgrade_is_ws = headers
        .get(http::header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);
    if !upgrade_is_ws {
        return false;
    }
    headers
        .get(http::header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|s| s.trim().eq_ignore_ascii_case("upgrade")))
        .unwrap_or(false)
}
