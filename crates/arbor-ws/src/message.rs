//! WebSocket message types

use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

/// A WebSocket message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// UTF-8 text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
    /// Ping control frame
    Ping(Vec<u8>),
    /// Pong control frame
    Pong(Vec<u8>),
    /// Close frame
    Close(Option<CloseFrame>),
}

impl Message {
    /// Create a text message
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a binary message
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::Binary(data.into())
    }

    /// Create a close message
    pub fn close() -> Self {
        Self::Close(None)
    }

    /// Create a close message with a code and reason
    pub fn close_with(code: CloseCode, reason: impl Into<String>) -> Self {
        Self::Close(Some(CloseFrame {
            code,
            reason: Cow::Owned(reason.into()),
        }))
    }

    /// Serialize a value to a JSON text message
    pub fn json<T: Serialize>(value: &T) -> Result<Self, crate::WsError> {
        Ok(Self::Text(serde_json::to_string(value)?))
    }

    /// Deserialize a text message as JSON
    pub fn as_json<T: DeserializeOwned>(&self) -> Result<T, crate::WsError> {
        match self {
            Self::Text(text) => Ok(serde_json::from_str(text)?),
            _ => Err(crate::WsError::UnexpectedMessage(
                "JSON deserialization requires a text message",
            )),
        }
    }

    /// Text content, if this is a text message
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for close frames
    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close(_))
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<tungstenite::Message> for Message {
    fn from(msg: tungstenite::Message) -> Self {
        match msg {
            tungstenite::Message::Text(text) => Self::Text(text),
            tungstenite::Message::Binary(data) => Self::Binary(data),
            tungstenite::Message::Ping(data) => Self::Ping(data),
            tungstenite::Message::Pong(data) => Self::Pong(data),
            tungstenite::Message::Close(frame) => Self::Close(frame.map(|f| CloseFrame {
                code: CloseCode::from(u16::from(f.code)),
                reason: Cow::Owned(f.reason.into_owned()),
            })),
            // Raw frames do not surface to dialog callbacks.
            tungstenite::Message::Frame(_) => Self::Binary(Vec::new()),
        }
    }
}

impl From<Message> for tungstenite::Message {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(text) => tungstenite::Message::Text(text),
            Message::Binary(data) => tungstenite::Message::Binary(data),
            Message::Ping(data) => tungstenite::Message::Ping(data),
            Message::Pong(data) => tungstenite::Message::Pong(data),
            Message::Close(frame) => {
                tungstenite::Message::Close(frame.map(|f| tungstenite::protocol::CloseFrame {
                    code: tungstenite::protocol::frame::coding::CloseCode::from(f.code.as_u16()),
                    reason: f.reason,
                }))
            }
        }
    }
}

/// WebSocket close frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// Close code
    pub code: CloseCode,
    /// Close reason
    pub reason: Cow<'static, str>,
}

/// Common WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// Normal closure (1000)
    Normal,
    /// Going away (1001)
    Away,
    /// Protocol error (1002)
    Protocol,
    /// Unsupported data (1003)
    Unsupported,
    /// Policy violation (1008)
    Policy,
    /// Message too big (1009)
    Size,
    /// Internal error (1011)
    Error,
    /// Any other code
    Other(u16),
}

impl CloseCode {
    /// Numeric form of the code
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::Away => 1001,
            Self::Protocol => 1002,
            Self::Unsupported => 1003,
            Self::Policy => 1008,
            Self::Size => 1009,
            Self::Error => 1011,
            Self::Other(code) => *code,
        }
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        match code {
            1000 => Self::Normal,
            1001 => Self::Away,
            1002 => Self::Protocol,
            1003 => Self::Unsupported,
            1008 => Self::Policy,
            1009 => Self::Size,
            1011 => Self::Error,
            other => Self::Other(other),
        }
    }
}
