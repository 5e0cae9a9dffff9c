//! Arbor application builder and the frozen application
//!
//! Registration happens on the [`Arbor`] builder, strictly before serving;
//! [`Arbor::build`] consumes the builder into an immutable [`App`], so
//! registering after startup is unrepresentable rather than a runtime
//! error.

use crate::dispatch::{dispatch, Fallback};
use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler, IntoHandlerChain};
use crate::method::Method;
use crate::response::HttpResponse;
use crate::router::RouteTreeManager;
use crate::server::Server;
use bytes::Bytes;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Application builder for Arbor
///
/// # Example
///
/// ```rust,ignore
/// use arbor_core::{Arbor, HandlerStatus, Request, Response};
///
/// async fn hello(_req: Request, res: Response) -> HandlerStatus {
///     res.send_text("Hello, World!");
///     HandlerStatus::Final
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     Arbor::new()
///         .get("/", hello)
///         .run("127.0.0.1:8080")
///         .await
/// }
/// ```
pub struct Arbor {
    routes: RouteTreeManager,
    middleware: Vec<BoxedHandler>,
    ws_middleware: Vec<BoxedHandler>,
    fallback: Option<Arc<dyn Fallback>>,
}

impl Arbor {
    /// Create a new application builder
    pub fn new() -> Self {
        // Initialize tracing if not already done
        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,arbor=debug")),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        Self {
            routes: RouteTreeManager::new(),
            middleware: Vec::new(),
            ws_middleware: Vec::new(),
            fallback: None,
        }
    }

    /// Register a route for an arbitrary method.
    ///
    /// Fatal configuration errors (empty handler chain, duplicate pattern,
    /// misplaced wildcard) abort startup by panicking with the error; use
    /// [`Arbor::try_route`] for the `Result` form.
    pub fn route(self, method: Method, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        match self.try_route(method, pattern, handlers) {
            Ok(app) => app,
            Err(err) => panic!("{}", err),
        }
    }

    /// Register a route, surfacing configuration errors.
    pub fn try_route(
        mut self,
        method: Method,
        pattern: &str,
        handlers: impl IntoHandlerChain,
    ) -> Result<Self, RouteError> {
        self.routes.insert(method, pattern, handlers.into_chain())?;
        Ok(self)
    }

    /// Register a GET route
    pub fn get(self, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        self.route(Method::Get, pattern, handlers)
    }

    /// Register a POST route
    pub fn post(self, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        self.route(Method::Post, pattern, handlers)
    }

    /// Register a PUT route
    pub fn put(self, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        self.route(Method::Put, pattern, handlers)
    }

    /// Register a DELETE route
    pub fn delete(self, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        self.route(Method::Delete, pattern, handlers)
    }

    /// Register a WEBSOCKET route
    ///
    /// Upgrade requests are matched against their own tree and middleware
    /// stack; the handler chain runs before the handshake completes, so
    /// handlers can reject or transform it.
    pub fn web_socket(self, pattern: &str, handlers: impl IntoHandlerChain) -> Self {
        self.route(Method::WebSocket, pattern, handlers)
    }

    /// Append a middleware applied to every non-websocket request, in
    /// registration order, before the matched handler chain.
    pub fn middleware<H: Handler>(mut self, handler: H) -> Self {
        self.middleware.push(Arc::new(handler));
        self
    }

    /// Append a middleware applied to every websocket request.
    pub fn ws_middleware<H: Handler>(mut self, handler: H) -> Self {
        self.ws_middleware.push(Arc::new(handler));
        self
    }

    /// Install the generic fallback handler consulted on resolution misses
    /// and ahead of catch-all routes.
    pub fn fallback<F: Fallback>(mut self, fallback: F) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Freeze registration into an immutable, concurrently shareable
    /// application.
    pub fn build(self) -> App {
        App {
            inner: Arc::new(AppInner {
                routes: self.routes,
                middleware: self.middleware,
                ws_middleware: self.ws_middleware,
                fallback: self.fallback,
            }),
        }
    }

    /// Build and serve on `addr`
    pub async fn run(self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.build().run(addr).await
    }
}

impl Default for Arbor {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct AppInner {
    pub routes: RouteTreeManager,
    pub middleware: Vec<BoxedHandler>,
    pub ws_middleware: Vec<BoxedHandler>,
    pub fallback: Option<Arc<dyn Fallback>>,
}

/// A frozen Arbor application.
///
/// Route trees are read-only from here on; concurrent lookups need no
/// locking. Cloning shares the same application.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// Serve on `addr` until the process exits
    pub async fn run(self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Server::new(self).run(addr).await
    }

    /// Route and dispatch one request without a network socket.
    ///
    /// Useful for tests and for embedding the pipeline behind another
    /// transport.
    pub async fn handle(&self, req: http::Request<Bytes>) -> HttpResponse {
        let (parts, body) = req.into_parts();
        dispatch(&self.inner, parts, body, None).await
    }

    pub(crate) fn inner(&self) -> &AppInner {
        &self.inner
    }
}
