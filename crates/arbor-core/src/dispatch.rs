//! Per-request dispatch pipeline
//!
//! Runs the global middleware chain, then the matched handler chain, in
//! strict registration order with early exit on a non-`Continue` status or
//! a closed response. Unsupported wire methods are rejected before any tree
//! lookup. Panics raised by middleware or handlers are caught here and
//! converted to a 500 if nothing has been written yet; they never unwind
//! into the serving loop.

use crate::app::AppInner;
use crate::error::ApiError;
use crate::handler::{BoxedHandler, HandlerStatus};
use crate::method::Method;
use crate::request::Request;
use crate::response::{HttpResponse, Response};
use crate::router::split_segments;
use bytes::Bytes;
use futures_util::FutureExt;
use http::request::Parts;
use hyper::upgrade::OnUpgrade;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

/// Fallback consulted when resolution yields no exact match: on a full
/// miss, or before a catch-all route is accepted (an explicitly configured
/// fallback such as a static file handler outranks a wildcard route).
///
/// Returns `true` when it fully handled the request.
pub trait Fallback: Send + Sync + 'static {
    /// Attempt to handle `path`; write through `res` when doing so.
    fn call(
        &self,
        path: String,
        req: Request,
        res: Response,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'static>>;
}

impl<F, Fut> Fallback for F
where
    F: Fn(String, Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn call(
        &self,
        path: String,
        req: Request,
        res: Response,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'static>> {
        Box::pin(self(path, req, res))
    }
}

/// Whether a chain ran to completion or stopped early.
#[derive(PartialEq, Eq)]
enum ChainEnd {
    Completed,
    Stopped,
}

/// Dispatch one request through middleware, routing, and handlers.
pub(crate) async fn dispatch(
    app: &AppInner,
    parts: Parts,
    body: Bytes,
    upgrade: Option<OnUpgrade>,
) -> HttpResponse {
    let res = Response::new();

    // Unsupported wire methods never reach the route trees.
    let Some(method) = Method::from_request(&parts.method, &parts.headers) else {
        res.send_error(&ApiError::not_found(format!(
            "Unsupported method {}",
            parts.method
        )));
        return res.into_http();
    };

    let path = parts.uri.path().to_string();
    let segments = split_segments(&path);
    let resolved = app.routes.resolve(method, &segments);

    let owned_segments: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
    let req = Request::new(parts, body, owned_segments, resolved.params, upgrade);

    let middleware = match method {
        Method::WebSocket => &app.ws_middleware,
        _ => &app.middleware,
    };
    if run_chain(middleware, &req, &res).await == ChainEnd::Stopped {
        return res.into_http();
    }

    match resolved.entry {
        Some(entry) if !resolved.wildcard_fallback => {
            run_chain(&entry.handlers, &req, &res).await;
        }
        Some(entry) => {
            // Catch-all match: an explicitly configured fallback gets the
            // first shot.
            if !try_fallback(app, &path, &req, &res).await {
                run_chain(&entry.handlers, &req, &res).await;
            }
        }
        None => {
            if !try_fallback(app, &path, &req, &res).await && !res.is_closed() {
                res.send_error(&ApiError::not_found(format!(
                    "No route found for {} {}",
                    req.method(),
                    path
                )));
            }
        }
    }

    res.into_http()
}

async fn try_fallback(app: &AppInner, path: &str, req: &Request, res: &Response) -> bool {
    let Some(fallback) = app.fallback.as_ref() else {
        return false;
    };
    if res.is_closed() {
        return true;
    }
    let outcome = AssertUnwindSafe(fallback.call(path.to_string(), req.clone(), res.clone()))
        .catch_unwind()
        .await;
    match outcome {
        Ok(handled) => handled,
        Err(panic) => {
            tracing::error!(panic = panic_message(&panic), "fallback handler panicked");
            if !res.is_closed() {
                res.send_error(&ApiError::internal("Internal server error"));
            }
            true
        }
    }
}

/// Invoke chain items in order until one terminates the request.
///
/// Both signaling styles stop the chain: an explicit `Final`/`Error`
/// status, or the response being closed as a side effect of the call.
async fn run_chain(chain: &[BoxedHandler], req: &Request, res: &Response) -> ChainEnd {
    for handler in chain {
        if res.is_closed() {
            return ChainEnd::Stopped;
        }
        let outcome = AssertUnwindSafe(handler.call(req.clone(), res.clone()))
            .catch_unwind()
            .await;
        match outcome {
            Ok(HandlerStatus::Continue) => {
                if res.is_closed() {
                    return ChainEnd::Stopped;
                }
            }
            Ok(HandlerStatus::Final) => return ChainEnd::Stopped,
            Ok(HandlerStatus::Error) => {
                // The handler reports the error as handled; if it left the
                // response open, cover it with a generic 500.
                if !res.is_closed() {
                    res.send_error(&ApiError::internal("Request handler failed"));
                }
                return ChainEnd::Stopped;
            }
            Err(panic) => {
                tracing::error!(
                    method = %req.method(),
                    path = %req.path(),
                    panic = panic_message(&panic),
                    "handler panicked"
                );
                if !res.is_closed() {
                    res.send_error(&ApiError::internal("Internal server error"));
                }
                return ChainEnd::Stopped;
            }
        }
    }
    ChainEnd::Completed
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
