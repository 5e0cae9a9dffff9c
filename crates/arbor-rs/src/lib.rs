//! # Arbor
//!
//! An Express-style web framework for Rust.
//!
//! Register handler chains against URL patterns with named `:param`
//! captures and trailing `*` catch-alls, add middleware that runs before
//! every request, and serve over hyper. Routes are frozen into an
//! immutable tree when the application is built, so concurrent request
//! handling needs no locking.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arbor_rs::prelude::*;
//!
//! async fn hello(_req: Request, res: Response) -> HandlerStatus {
//!     res.send_text("Hello, World!");
//!     HandlerStatus::Final
//! }
//!
//! async fn show_user(req: Request, res: Response) -> HandlerStatus {
//!     res.send_text(format!("user {}", req.param("id").unwrap_or("?")));
//!     HandlerStatus::Final
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     Arbor::new()
//!         .get("/", hello)
//!         .get("/users/:id", show_user)
//!         .run("127.0.0.1:8080")
//!         .await
//! }
//! ```
//!
//! ## Pattern syntax
//!
//! - `/users` matches the literal segment, case-sensitively
//! - `/users/:id` captures one segment under the name `id`
//! - `/assets/*` catches the remainder of the path with a trailing `*`
//!
//! A literal match always beats a parameter, and a parameter beats a
//! catch-all; overlapping catch-alls are ranked by registration order.

// Re-export core functionality
pub use arbor_core::*;

// Re-export WebSocket support
pub use arbor_ws as ws;

/// Prelude module for convenient imports
pub mod prelude {
    pub use arbor_core::{
        ApiError, App, Arbor, Fallback, Handler, HandlerStatus, Method, PathParams, Request,
        Response, RouteError,
    };
    pub use arbor_ws::{CloseCode, CloseFrame, Dialog, Message, WsError, WsSender};
}
