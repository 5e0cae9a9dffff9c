//! WebSocket error types

use thiserror::Error;

/// Error type for WebSocket operations
#[derive(Error, Debug)]
pub enum WsError {
    /// The request is not a valid WebSocket upgrade
    #[error("invalid websocket upgrade request: {0}")]
    InvalidUpgrade(String),

    /// The request carries no claimable upgrade handshake (already taken,
    /// or the transport does not support upgrades)
    #[error("upgrade handshake is not available on this request")]
    UpgradeUnavailable,

    /// The connection is closed
    #[error("websocket connection closed")]
    ConnectionClosed,

    /// JSON message (de)serialization failed
    #[error("message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation applied to the wrong message type
    #[error("unexpected message type: {0}")]
    UnexpectedMessage(&'static str),

    /// Underlying protocol error
    #[error("websocket protocol error: {0}")]
    Protocol(#[from] tungstenite::Error),
}

impl WsError {
    /// Create an invalid-upgrade error
    pub fn invalid_upgrade(msg: impl Into<String>) -> Self {
        Self::InvalidUpgrade(msg.into())
    }
}

impl From<WsError> for arbor_core::ApiError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::InvalidUpgrade(msg) => {
                arbor_core::ApiError::bad_request(format!("WebSocket upgrade failed: {}", msg))
            }
            WsError::UpgradeUnavailable => {
                arbor_core::ApiError::bad_request("WebSocket upgrade is not available")
            }
            _ => arbor_core::ApiError::internal(err.to_string()),
        }
    }
}
