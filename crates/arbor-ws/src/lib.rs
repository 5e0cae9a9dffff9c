//! # arbor-ws
//!
//! WebSocket support for the Arbor framework.
//!
//! A WEBSOCKET route handler claims the pending handshake from the
//! request, registers message callbacks, and accepts. The socket's read
//! loop starts only after the whole handler chain has finished, so
//! middleware and handlers can still reject or transform the handshake.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arbor_rs::prelude::*;
//!
//! async fn echo(req: Request, res: Response) -> HandlerStatus {
//!     let dialog = match Dialog::attach(&req) {
//!         Ok(dialog) => dialog,
//!         Err(err) => {
//!             res.send_error(&err.into());
//!             return HandlerStatus::Error;
//!         }
//!     };
//!     dialog.on_text(|text, sender| async move {
//!         let _ = sender.send_text(format!("Echo: {}", text)).await;
//!     });
//!     dialog.accept(&res);
//!     HandlerStatus::Final
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     Arbor::new()
//!         .web_socket("/echo", echo)
//!         .run("127.0.0.1:8080")
//!         .await
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod dialog;
mod error;
mod handshake;
mod message;

pub use dialog::{Dialog, WsSender};
pub use error::WsError;
pub use handshake::validate_upgrade_request;
pub use message::{CloseCode, CloseFrame, Message};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CloseCode, CloseFrame, Dialog, Message, WsError, WsSender};
}
