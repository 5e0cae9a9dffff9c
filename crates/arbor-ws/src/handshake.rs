//! RFC 6455 upgrade validation and accept-key derivation

use crate::error::WsError;
use http::{header, HeaderMap};

const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Derive the `Sec-WebSocket-Accept` value from the client's key.
pub(crate) fn accept_key(key: &str) -> String {
    use base64::Engine;
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

/// Validate that a request is a well-formed WebSocket upgrade and return
/// the client's `Sec-WebSocket-Key`.
pub fn validate_upgrade_request(
    method: &http::Method,
    headers: &HeaderMap,
) -> Result<String, WsError> {
    if method != http::Method::GET {
        return Err(WsError::invalid_upgrade("method must be GET"));
    }

    let upgrade = headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WsError::invalid_upgrade("missing Upgrade header"))?;
    if !upgrade.eq_ignore_ascii_case("websocket") {
        return Err(WsError::invalid_upgrade("Upgrade header must be 'websocket'"));
    }

    let connection = headers
        .get(header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WsError::invalid_upgrade("missing Connection header"))?;
    if !connection
        .split(',')
        .any(|s| s.trim().eq_ignore_ascii_case("upgrade"))
    {
        return Err(WsError::invalid_upgrade(
            "Connection header must contain 'Upgrade'",
        ));
    }

    let sec_key = headers
        .get(header::SEC_WEBSOCKET_KEY)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WsError::invalid_upgrade("missing Sec-WebSocket-Key header"))?;

    let version = headers
        .get(header::SEC_WEBSOCKET_VERSION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WsError::invalid_upgrade("missing Sec-WebSocket-Version header"))?;
    if version != "13" {
        return Err(WsError::invalid_upgrade("Sec-WebSocket-Version must be 13"));
    }

    Ok(sec_key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn upgrade_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::UPGRADE, HeaderValue::from_static("websocket"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("Upgrade"));
        headers.insert(
            header::SEC_WEBSOCKET_KEY,
            HeaderValue::from_static("dGhlIHNhbXBsZSBub25jZQ=="),
        );
        headers.insert(header::SEC_WEBSOCKET_VERSION, HeaderValue::from_static("13"));
        headers
    }

    #[test]
    fn test_accept_key_rfc_vector() {
        // Example from RFC 6455 section 1.3
        let accept = accept_key("dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn test_valid_upgrade_passes() {
        let key = validate_upgrade_request(&http::Method::GET, &upgrade_headers()).unwrap();
        assert_eq!(key, "dGhlIHNhbXBsZSBub25jZQ==");
    }

    #[test]
    fn test_non_get_is_rejected() {
        let err = validate_upgrade_request(&http::Method::POST, &upgrade_headers()).unwrap_err();
        assert!(matches!(err, WsError::InvalidUpgrade(_)));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut headers = upgrade_headers();
        headers.remove(header::SEC_WEBSOCKET_KEY);
        assert!(validate_upgrade_request(&http::Method::GET, &headers).is_err());
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let mut headers = upgrade_headers();
        headers.insert(header::SEC_WEBSOCKET_VERSION, HeaderValue::from_static("8"));
        assert!(validate_upgrade_request(&http::Method::GET, &headers).is_err());
    }

    #[test]
    fn test_connection_header_list_form() {
        let mut headers = upgrade_headers();
        headers.insert(
            header::CONNECTION,
            HeaderValue::from_static("keep-alive, Upgrade"),
        );
        assert!(validate_upgrade_request(&http::Method::GET, &headers).is_ok());
    }
}
