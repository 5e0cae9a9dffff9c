//! Socket dialog handle
//!
//! A [`Dialog`] is created inside a WEBSOCKET handler from the request,
//! while the handshake is still pending. Handlers register message
//! callbacks and then call [`Dialog::accept`], which writes the 101
//! response and arms the message pump. The pump waits on hyper's upgrade
//! future, which resolves only after the response has been written back to
//! the client, so the read loop cannot start before the entire middleware
//! and handler chain has finished. A handler (or middleware) that writes an
//! error response instead of accepting rejects the handshake.

use crate::error::WsError;
use crate::handshake::{accept_key, validate_upgrade_request};
use crate::message::{CloseFrame, Message};
use arbor_core::{Request, Response};
use futures_util::{SinkExt, StreamExt};
use http::{header, HeaderValue, StatusCode};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::WebSocketStream;

type CallbackFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type TextCallback = Arc<dyn Fn(String, WsSender) -> CallbackFuture + Send + Sync>;
type BinaryCallback = Arc<dyn Fn(Vec<u8>, WsSender) -> CallbackFuture + Send + Sync>;
type CloseCallback = Arc<dyn Fn(Option<CloseFrame>) -> CallbackFuture + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    on_text: Option<TextCallback>,
    on_binary: Option<BinaryCallback>,
    on_close: Option<CloseCallback>,
}

struct DialogInner {
    accept: String,
    upgrade: Mutex<Option<OnUpgrade>>,
    callbacks: Mutex<Callbacks>,
    outbound_tx: mpsc::Sender<Message>,
    outbound_rx: Mutex<Option<mpsc::Receiver<Message>>>,
}

impl DialogInner {
    fn lock_callbacks(&self) -> std::sync::MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle for one pending or open websocket conversation.
///
/// Cloning shares the dialog; callbacks registered through any clone are
/// seen by the pump, including registrations made by a later handler in
/// the same chain.
#[derive(Clone)]
pub struct Dialog {
    inner: Arc<DialogInner>,
}

impl Dialog {
    /// Claim the pending handshake from an upgrade request.
    ///
    /// Validates the upgrade headers and takes the one-shot upgrade future;
    /// a second attach on the same request fails with
    /// [`WsError::UpgradeUnavailable`].
    pub fn attach(req: &Request) -> Result<Self, WsError> {
        let sec_key = validate_upgrade_request(req.method(), req.headers())?;
        let upgrade = req.take_upgrade().ok_or(WsError::UpgradeUnavailable)?;
        let (outbound_tx, outbound_rx) = mpsc::channel(32);

        Ok(Self {
            inner: Arc::new(DialogInner {
                accept: accept_key(&sec_key),
                upgrade: Mutex::new(Some(upgrade)),
                callbacks: Mutex::new(Callbacks::default()),
                outbound_tx,
                outbound_rx: Mutex::new(Some(outbound_rx)),
            }),
        })
    }

    /// Register the text-message callback.
    pub fn on_text<F, Fut>(&self, callback: F)
    where
        F: Fn(String, WsSender) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.lock_callbacks().on_text =
            Some(Arc::new(move |text, sender| Box::pin(callback(text, sender))));
    }

    /// Register the binary-message callback.
    pub fn on_binary<F, Fut>(&self, callback: F)
    where
        F: Fn(Vec<u8>, WsSender) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.lock_callbacks().on_binary =
            Some(Arc::new(move |data, sender| Box::pin(callback(data, sender))));
    }

    /// Register the close callback, invoked once when the peer closes or
    /// the stream ends.
    pub fn on_close<F, Fut>(&self, callback: F)
    where
        F: Fn(Option<CloseFrame>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.lock_callbacks().on_close =
            Some(Arc::new(move |frame| Box::pin(callback(frame))));
    }

    /// Outbound sender for this dialog.
    ///
    /// Usable before the socket opens; messages queue until the pump
    /// drains them.
    pub fn sender(&self) -> WsSender {
        WsSender {
            tx: self.inner.outbound_tx.clone(),
        }
    }

    /// Write the 101 handshake response and arm the message pump.
    ///
    /// Idempotent: a second call is a logged no-op.
    pub fn accept(&self, res: &Response) {
        let upgrade = self
            .inner
            .upgrade
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(upgrade) = upgrade else {
            tracing::warn!("websocket dialog already accepted");
            return;
        };

        res.set_status(StatusCode::SWITCHING_PROTOCOLS);
        res.insert_header(header::UPGRADE, HeaderValue::from_static("websocket"));
        res.insert_header(header::CONNECTION, HeaderValue::from_static("Upgrade"));
        if let Ok(value) = HeaderValue::from_str(&self.inner.accept) {
            res.insert_header(header::SEC_WEBSOCKET_ACCEPT, value);
        }
        res.close();

        let inner = self.inner.clone();
        tokio::spawn(async move {
            pump(inner, upgrade).await;
        });
    }
}

/// Cloneable outbound half of a dialog
#[derive(Clone)]
pub struct WsSender {
    tx: mpsc::Sender<Message>,
}

impl WsSender {
    /// Send a message
    pub async fn send(&self, message: Message) -> Result<(), WsError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| WsError::ConnectionClosed)
    }

    /// Send a text message
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), WsError> {
        self.send(Message::text(text)).await
    }

    /// Send a binary message
    pub async fn send_binary(&self, data: impl Into<Vec<u8>>) -> Result<(), WsError> {
        self.send(Message::binary(data)).await
    }

    /// Send a JSON text message
    pub async fn send_json<T: Serialize>(&self, value: &T) -> Result<(), WsError> {
        self.send(Message::json(value)?).await
    }

    /// Send a close frame; the pump shuts the connection down after
    /// writing it.
    pub async fn close(&self) -> Result<(), WsError> {
        self.send(Message::close()).await
    }
}

/// Long-lived read loop: runs only after hyper releases the upgraded
/// connection, i.e. after the handshake response has been written.
async fn pump(inner: Arc<DialogInner>, upgrade: OnUpgrade) {
    let upgraded = match upgrade.await {
        Ok(upgraded) => upgraded,
        Err(err) => {
            tracing::error!("websocket upgrade failed: {}", err);
            return;
        }
    };
    let stream =
        WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None).await;
    let (mut sink, mut source) = stream.split();

    let mut outbound = match inner
        .outbound_rx
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        Some(rx) => rx,
        None => return,
    };
    let sender = WsSender {
        tx: inner.outbound_tx.clone(),
    };

    loop {
        tokio::select! {
            incoming = source.next() => match incoming {
                Some(Ok(raw)) => match Message::from(raw) {
                    Message::Ping(payload) => {
                        if sink.send(tungstenite::Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Close(frame) => {
                        notify_close(&inner, frame).await;
                        break;
                    }
                    Message::Text(text) => {
                        let callback = inner.lock_callbacks().on_text.clone();
                        if let Some(callback) = callback {
                            callback(text, sender.clone()).await;
                        }
                    }
                    Message::Binary(data) => {
                        let callback = inner.lock_callbacks().on_binary.clone();
                        if let Some(callback) = callback {
                            callback(data, sender.clone()).await;
                        }
                    }
                },
                Some(Err(err)) => {
                    tracing::debug!("websocket read error: {}", err);
                    notify_close(&inner, None).await;
                    break;
                }
                None => {
                    notify_close(&inner, None).await;
                    break;
                }
            },
            outgoing = outbound.recv() => match outgoing {
                Some(message) => {
                    let closing = message.is_close();
                    if sink.send(message.into()).await.is_err() {
                        break;
                    }
                    if closing {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

async fn notify_close(inner: &DialogInner, frame: Option<CloseFrame>) {
    let callback = inner.lock_callbacks().on_close.clone();
    if let Some(callback) = callback {
        callback(frame).await;
    }
}
