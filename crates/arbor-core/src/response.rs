//! Response handle with single-writer close semantics
//!
//! Middleware and handlers for one request all write through clones of the
//! same handle. The first terminal write closes it; once closed, further
//! writes are ignored, so components check [`Response::is_closed`] before
//! writing. The handle is only ever mutated by the single task driving its
//! request.

use crate::error::{ApiError, ErrorResponse};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fully materialized HTTP response produced at the end of dispatch
pub type HttpResponse = http::Response<Full<Bytes>>;

/// Shared, writable response handle.
#[derive(Clone)]
pub struct Response {
    inner: Arc<Mutex<State>>,
}

#[derive(Clone)]
struct State {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    closed: bool,
}

impl Response {
    /// Create a fresh handle: 200, no headers, empty body, open.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: Bytes::new(),
                closed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current status code
    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    /// True once a terminal write has happened; nothing further will be
    /// written to this response.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Set the status code. Ignored once closed.
    pub fn set_status(&self, status: StatusCode) {
        let mut state = self.lock();
        if !state.closed {
            state.status = status;
        }
    }

    /// Insert a header. Ignored once closed.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        let mut state = self.lock();
        if !state.closed {
            state.headers.insert(name, value);
        }
    }

    /// Mark the response closed without writing a body.
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// Write a plain-text body and close. Ignored once closed.
    pub fn send_text(&self, text: impl Into<String>) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        if !state.headers.contains_key(header::CONTENT_TYPE) {
            state.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        state.body = Bytes::from(text.into());
        state.closed = true;
    }

    /// Serialize `value` to JSON, write it, and close. Ignored once closed.
    pub fn send_json<T: Serialize>(&self, value: &T) -> Result<(), ApiError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApiError::internal(format!("Failed to serialize response: {}", e)))?;
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        state.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        state.body = Bytes::from(bytes);
        state.closed = true;
        Ok(())
    }

    /// Status-only terminal write. Ignored once closed.
    pub fn send_status(&self, status: StatusCode) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.status = status;
        state.closed = true;
    }

    /// Write the JSON error envelope for `err` and close. Ignored once
    /// closed.
    pub fn send_error(&self, err: &ApiError) {
        let body = serde_json::to_vec(&ErrorResponse::from(err)).unwrap_or_else(|_| {
            br#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#.to_vec()
        });
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.status = err.status;
        state.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        state.body = Bytes::from(body);
        state.closed = true;
    }

    /// Materialize the accumulated state into an HTTP response.
    pub(crate) fn into_http(self) -> HttpResponse {
        let state = match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            // A handler kept a clone of the handle; snapshot the state.
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        };

        let mut builder = http::Response::builder().status(state.status);
        if let Some(headers) = builder.headers_mut() {
            *headers = state.headers;
        }
        builder
            .body(Full::new(state.body))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
