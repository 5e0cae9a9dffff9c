//! HTTP server implementation

use crate::app::App;
use crate::dispatch::dispatch;
use crate::error::ApiError;
use crate::method::Method;
use crate::response::{HttpResponse, Response};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Internal server struct
pub(crate) struct Server {
    app: App,
}

impl Server {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Run the accept loop, one task per connection.
    pub async fn run(self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Arbor server running on http://{}", addr);

        loop {
            let (stream, _remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = self.app.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    let app = app.clone();
                    async move {
                        let response = handle_request(app, req).await;
                        Ok::<_, Infallible>(response)
                    }
                });

                // with_upgrades keeps the connection claimable for the
                // websocket handshake.
                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .with_upgrades()
                    .await
                {
                    error!("Connection error: {}", err);
                }
            });
        }
    }
}

/// Handle a single HTTP request
async fn handle_request(app: App, mut req: hyper::Request<Incoming>) -> HttpResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();

    // Upgrade requests keep their hyper upgrade future so a websocket
    // handler can complete the handshake; plain requests buffer the body.
    let is_upgrade =
        Method::from_request(req.method(), req.headers()) == Some(Method::WebSocket);
    let upgrade = is_upgrade.then(|| hyper::upgrade::on(&mut req));

    let (parts, incoming) = req.into_parts();
    let body = if is_upgrade {
        Bytes::new()
    } else {
        match incoming.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                let res = Response::new();
                res.send_error(&ApiError::bad_request(format!(
                    "Failed to read request body: {}",
                    err
                )));
                let response = res.into_http();
                log_request(&method, &path, response.status(), start);
                return response;
            }
        }
    };

    let response = dispatch(app.inner(), parts, body, upgrade).await;
    log_request(&method, &path, response.status(), start);
    response
}

/// Log request completion
fn log_request(method: &http::Method, path: &str, status: StatusCode, start: std::time::Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() || status.is_client_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    }
}
