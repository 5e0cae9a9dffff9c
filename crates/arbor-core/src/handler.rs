//! Handler trait, chain status signal, and chain conversions

use crate::request::Request;
use crate::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Signal returned by every middleware and handler invocation.
///
/// A chain stops at the first non-`Continue` result. Handlers that
/// communicate termination by closing the response instead of returning a
/// status are honored too: the dispatcher re-checks
/// [`Response::is_closed`](crate::Response::is_closed) after every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStatus {
    /// Keep invoking the next item in the chain.
    Continue,
    /// Stop; the response is considered complete.
    Final,
    /// Stop; the error has already been handled and reported.
    Error,
}

/// Future returned by handler invocations
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerStatus> + Send + 'static>>;

/// Trait representing an async handler or middleware function
///
/// Implemented for any `Fn(Request, Response) -> impl Future<Output =
/// HandlerStatus>` closure, so plain async functions register directly.
pub trait Handler: Send + Sync + 'static {
    /// Invoke the handler for one request.
    fn call(&self, req: Request, res: Response) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerStatus> + Send + 'static,
{
    fn call(&self, req: Request, res: Response) -> HandlerFuture {
        Box::pin(self(req, res))
    }
}

/// Type-erased handler stored in route chains and middleware lists
pub type BoxedHandler = Arc<dyn Handler>;

/// Conversion of registration arguments into an ordered handler chain.
///
/// Implemented for a single handler, for tuples of two to five handlers,
/// and for `Vec<BoxedHandler>` (the only form that can be empty, which is
/// rejected at registration).
pub trait IntoHandlerChain {
    /// Produce the ordered chain.
    fn into_chain(self) -> Vec<BoxedHandler>;
}

impl<H: Handler> IntoHandlerChain for H {
    fn into_chain(self) -> Vec<BoxedHandler> {
        vec![Arc::new(self)]
    }
}

impl IntoHandlerChain for Vec<BoxedHandler> {
    fn into_chain(self) -> Vec<BoxedHandler> {
        self
    }
}

macro_rules! impl_into_handler_chain {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($name: Handler),+> IntoHandlerChain for ($($name,)+) {
            fn into_chain(self) -> Vec<BoxedHandler> {
                let ($($name,)+) = self;
                vec![$(Arc::new($name) as BoxedHandler),+]
            }
        }
    };
}

impl_into_handler_chain!(H1, H2);
impl_into_handler_chain!(H1, H2, H3);
impl_into_handler_chain!(H1, H2, H3, H4);
impl_into_handler_chain!(H1, H2, H3, H4, H5);
