//! # Arbor Core
//!
//! Core library providing the routing trie, the dispatch pipeline, and the
//! HTTP server for Arbor.
//!
//! This crate is not meant to be used directly. Use `arbor-rs` instead.

mod app;
mod dispatch;
mod error;
mod handler;
mod method;
mod params;
mod request;
mod response;
mod router;
mod server;

// Public API
pub use app::{App, Arbor};
pub use dispatch::Fallback;
pub use error::{ApiError, Result, RouteError};
pub use handler::{BoxedHandler, Handler, HandlerFuture, HandlerStatus, IntoHandlerChain};
pub use method::Method;
pub use params::PathParams;
pub use request::Request;
pub use response::{HttpResponse, Response};
