//! Realtime channel: one self-healing WebSocket connection per widget
//!
//! Each channel runs as a Tokio task that owns its socket and reconnect timer.
//! It never touches widget state directly. Everything it observes (state
//! transitions, decoded payloads) is sent to the page as a
//! [`ChannelEnvelope`] tagged with the owning element and a channel
//! generation, and the host drops envelopes from generations it has replaced.
//!
//! ```text
//!   Connecting ──ok──▶ Connected ──drop/error──▶ Error ──backoff──▶ Connecting
//!       │                  │
//!       │ refused          │ clean close (1000/1001)
//!       ▼                  ▼
//!     Error           Disconnected (stays down unless configured otherwise)
//! ```
//!
//! Closing a channel on purpose (`close`, or dropping it) ends the task: the
//! pending reconnect timer is cancelled and no further attempt is made.

mod backoff;
mod transport;

pub use backoff::{Backoff, BackoffPolicy};
pub use transport::{Frame, Socket, Transport, WebSocketTransport, CLOSE_GOING_AWAY, CLOSE_NORMAL};

#[cfg(test)]
pub(crate) use transport::mock;

use crate::error::{DecodeError, TransportError};
use crate::widget::ElementId;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Connection lifecycle as shown to widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a channel observed
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    State(ConnectionState),
    /// A decoded JSON payload
    Message(serde_json::Value),
}

/// A channel event addressed to its owning element
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEnvelope {
    pub element: ElementId,
    pub generation: u64,
    pub event: ChannelEvent,
}

pub type ChannelSink = mpsc::UnboundedSender<ChannelEnvelope>;

/// Connection policy shared by every channel on a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealtimeConfig {
    pub backoff: BackoffPolicy,
    /// Reconnect after the server closes with 1000/1001
    pub reconnect_on_clean_close: bool,
    pub connect_timeout: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            reconnect_on_clean_close: false,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Decode one text payload. Anything that isn't JSON is rejected here so
/// widgets only ever see well-formed values.
pub fn decode_text(text: &str) -> Result<serde_json::Value, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

/// Binary frames are accepted when they carry UTF-8 JSON
pub fn decode_binary(bytes: Vec<u8>) -> Result<serde_json::Value, DecodeError> {
    let text = String::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    decode_text(&text)
}

/// Handle to a running channel task
#[derive(Debug)]
pub struct RealtimeChannel {
    url: String,
    generation: u64,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Start connecting in the background.
    ///
    /// Must be called from within a Tokio runtime. Without one the channel is
    /// reported as `Error` and never connects.
    pub fn open(
        url: &str,
        element: ElementId,
        generation: u64,
        transport: Arc<dyn Transport>,
        config: RealtimeConfig,
        sink: ChannelSink,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = ChannelTask {
            url: url.to_string(),
            element,
            generation,
            transport,
            config,
            sink,
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(task.run(shutdown_rx))),
            Err(_) => {
                tracing::error!("No async runtime; realtime channel to {} not started", url);
                task.emit_state(ConnectionState::Error);
                None
            }
        };

        Self {
            url: url.to_string(),
            generation,
            shutdown: Some(shutdown_tx),
            task: handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Intentional close: stop reading, cancel any pending reconnect
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // Task already finished on its own
            let _ = tx.send(());
        }
    }

    /// Close and wait for the task to wind down
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Realtime channel task for {} ended abnormally: {}", self.url, e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// ─── Task ───────────────────────────────────────────────────────────────────

/// How a connected session ended
enum SessionEnd {
    /// Closed on our side, or nobody is listening anymore
    Shutdown,
    /// Server closed with 1000/1001
    CleanClose,
    Failed(String),
}

struct ChannelTask {
    url: String,
    element: ElementId,
    generation: u64,
    transport: Arc<dyn Transport>,
    config: RealtimeConfig,
    sink: ChannelSink,
}

impl ChannelTask {
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut backoff = Backoff::new(self.config.backoff);

        loop {
            if !self.emit_state(ConnectionState::Connecting) {
                return;
            }

            let connect = tokio::time::timeout(
                self.config.connect_timeout,
                self.transport.connect(&self.url),
            );
            let connected = tokio::select! {
                _ = &mut shutdown => {
                    self.emit_state(ConnectionState::Disconnected);
                    return;
                }
                result = connect => result,
            };

            match connected {
                Ok(Ok(mut socket)) => {
                    backoff.reset();
                    tracing::info!("Realtime channel {} connected to {}", self.element, self.url);
                    if !self.emit_state(ConnectionState::Connected) {
                        socket.close().await;
                        return;
                    }

                    match self.session(socket.as_mut(), &mut shutdown).await {
                        SessionEnd::Shutdown => {
                            socket.close().await;
                            self.emit_state(ConnectionState::Disconnected);
                            tracing::debug!("Realtime channel {} closed", self.element);
                            return;
                        }
                        SessionEnd::CleanClose => {
                            self.emit_state(ConnectionState::Disconnected);
                            if !self.config.reconnect_on_clean_close {
                                tracing::info!("Server closed {} cleanly; not reconnecting", self.url);
                                return;
                            }
                        }
                        SessionEnd::Failed(reason) => {
                            tracing::warn!("Realtime connection to {} lost: {}", self.url, reason);
                            self.emit_state(ConnectionState::Error);
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    self.emit_state(ConnectionState::Error);
                }
                Err(_) => {
                    let error = TransportError::Timeout {
                        url: self.url.clone(),
                    };
                    tracing::warn!("{} after {:?}", error, self.config.connect_timeout);
                    self.emit_state(ConnectionState::Error);
                }
            }

            let delay = backoff.next_delay();
            tracing::info!(
                "Reconnecting {} to {} in {:?} (attempt {})",
                self.element,
                self.url,
                delay,
                backoff.attempt()
            );
            tokio::select! {
                _ = &mut shutdown => {
                    self.emit_state(ConnectionState::Disconnected);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Read frames until the session ends
    async fn session(
        &self,
        socket: &mut dyn Socket,
        shutdown: &mut oneshot::Receiver<()>,
    ) -> SessionEnd {
        loop {
            let frame = tokio::select! {
                _ = &mut *shutdown => return SessionEnd::Shutdown,
                frame = socket.recv() => frame,
            };

            let decoded = match frame {
                Some(Ok(Frame::Text(text))) => decode_text(&text),
                Some(Ok(Frame::Binary(bytes))) => decode_binary(bytes),
                Some(Ok(close @ Frame::Close(_))) => {
                    if close.is_clean_close() {
                        return SessionEnd::CleanClose;
                    }
                    return SessionEnd::Failed(format!("server closed with {:?}", close));
                }
                Some(Err(e)) => return SessionEnd::Failed(e.to_string()),
                None => return SessionEnd::Failed("stream ended without close frame".into()),
            };

            match decoded {
                Ok(payload) => {
                    if !self.send(ChannelEvent::Message(payload)) {
                        return SessionEnd::Shutdown;
                    }
                }
                // Malformed input never reaches the widget and never changes state
                Err(e) => tracing::warn!("Dropping frame from {}: {}", self.url, e),
            }
        }
    }

    fn emit_state(&self, state: ConnectionState) -> bool {
        tracing::debug!("Realtime channel {} -> {}", self.element, state);
        self.send(ChannelEvent::State(state))
    }

    /// False once the page has gone away
    fn send(&self, event: ChannelEvent) -> bool {
        self.sink
            .send(ChannelEnvelope {
                element: self.element,
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}
