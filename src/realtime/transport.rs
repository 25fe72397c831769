// WebSocket transport seam
//
// The channel talks to a `Transport` (connect) and a `Socket` (receive,
// close). Production uses tokio-tungstenite; tests script connects and
// frames in memory so reconnect timing can run on a paused clock.

use crate::error::TransportError;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Normal closure
pub const CLOSE_NORMAL: u16 = 1000;
/// Endpoint going away (server shutdown, page navigation)
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Application-level frame as seen by the channel
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// Close frame with its status code, if the peer sent one
    Close(Option<u16>),
}

impl Frame {
    /// Close frames with 1000/1001 mean the server ended the session on purpose
    pub fn is_clean_close(&self) -> bool {
        matches!(self, Frame::Close(Some(CLOSE_NORMAL | CLOSE_GOING_AWAY)))
    }
}

/// One open connection
pub trait Socket: Send {
    /// Next frame. `None` means the stream ended without a close frame.
    fn recv(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>>;

    /// Send a normal close and release the connection
    fn close(&mut self) -> BoxFuture<'_, ()>;
}

/// Opens sockets
pub trait Transport: Send + Sync {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Socket>, TransportError>>;
}

// ─── tokio-tungstenite ──────────────────────────────────────────────────────

/// Real WebSocket client
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl Transport for WebSocketTransport {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Socket>, TransportError>> {
        Box::pin(async move {
            let (stream, response) =
                tokio_tungstenite::connect_async(url)
                    .await
                    .map_err(|e| TransportError::Connect {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
            tracing::debug!("WebSocket handshake with {} -> {}", url, response.status());
            Ok(Box::new(TungsteniteSocket { stream }) as Box<dyn Socket>)
        })
    }
}

struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Socket for TungsteniteSocket {
    fn recv(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>> {
        Box::pin(async move {
            loop {
                let message = match self.stream.next().await? {
                    Ok(message) => message,
                    Err(e) => return Some(Err(TransportError::Socket(e.to_string()))),
                };
                match message {
                    Message::Text(text) => return Some(Ok(Frame::Text(text))),
                    Message::Binary(bytes) => return Some(Ok(Frame::Binary(bytes))),
                    Message::Close(frame) => {
                        return Some(Ok(Frame::Close(frame.map(|f| u16::from(f.code)))))
                    }
                    // Control frames are answered by tungstenite itself
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                }
            }
        })
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.stream.close(None).await {
                tracing::debug!("WebSocket close: {}", e);
            }
        })
    }
}

// ─── Scripted transport (tests) ─────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    enum Outcome {
        Refuse,
        /// Connect never resolves
        Hang,
        Accept(mpsc::UnboundedReceiver<Result<Frame, TransportError>>),
    }

    /// Transport whose connect results are queued up front.
    /// An empty queue refuses.
    #[derive(Default)]
    pub struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Outcome>>,
        attempts: AtomicUsize,
        urls: Mutex<Vec<String>>,
        closes: Arc<AtomicUsize>,
    }

    /// Server side of an accepted scripted connection
    pub struct ScriptedServer {
        tx: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    }

    impl ScriptedServer {
        pub fn send_text(&self, text: &str) {
            let _ = self.tx.send(Ok(Frame::Text(text.to_string())));
        }

        pub fn send_json(&self, value: serde_json::Value) {
            self.send_text(&value.to_string());
        }

        pub fn send_binary(&self, bytes: Vec<u8>) {
            let _ = self.tx.send(Ok(Frame::Binary(bytes)));
        }

        pub fn close(&self, code: u16) {
            let _ = self.tx.send(Ok(Frame::Close(Some(code))));
        }

        pub fn fail(&self, reason: &str) {
            let _ = self.tx.send(Err(TransportError::Socket(reason.to_string())));
        }
    }

    impl ScriptedTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn refuse(&self) {
            self.lock_outcomes().push_back(Outcome::Refuse);
        }

        pub fn hang(&self) {
            self.lock_outcomes().push_back(Outcome::Hang);
        }

        pub fn accept(&self) -> ScriptedServer {
            let (tx, rx) = mpsc::unbounded_channel();
            self.lock_outcomes().push_back(Outcome::Accept(rx));
            ScriptedServer { tx }
        }

        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }

        /// Sockets closed by the client
        pub fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        fn lock_outcomes(&self) -> std::sync::MutexGuard<'_, VecDeque<Outcome>> {
            self.outcomes.lock().unwrap()
        }
    }

    impl Transport for ScriptedTransport {
        fn connect<'a>(
            &'a self,
            url: &'a str,
        ) -> BoxFuture<'a, Result<Box<dyn Socket>, TransportError>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            let outcome = self.lock_outcomes().pop_front().unwrap_or(Outcome::Refuse);
            let closes = self.closes.clone();
            Box::pin(async move {
                match outcome {
                    Outcome::Refuse => Err(TransportError::Connect {
                        url: url.to_string(),
                        reason: "connection refused".to_string(),
                    }),
                    Outcome::Hang => std::future::pending().await,
                    Outcome::Accept(rx) => {
                        Ok(Box::new(ScriptedSocket { rx, closes }) as Box<dyn Socket>)
                    }
                }
            })
        }
    }

    struct ScriptedSocket {
        rx: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
        closes: Arc<AtomicUsize>,
    }

    impl Socket for ScriptedSocket {
        fn recv(&mut self) -> BoxFuture<'_, Option<Result<Frame, TransportError>>> {
            Box::pin(self.rx.recv())
        }

        fn close(&mut self) -> BoxFuture<'_, ()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_close_codes() {
        assert!(Frame::Close(Some(1000)).is_clean_close());
        assert!(Frame::Close(Some(1001)).is_clean_close());
        assert!(!Frame::Close(Some(1006)).is_clean_close());
        assert!(!Frame::Close(None).is_clean_close());
        assert!(!Frame::Text("x".into()).is_clean_close());
    }

    #[tokio::test]
    async fn test_refused_connect_reports_url() {
        // Port 1 on loopback is never listening
        let result = WebSocketTransport.connect("ws://127.0.0.1:1/feed").await;
        match result {
            Err(TransportError::Connect { url, .. }) => assert_eq!(url, "ws://127.0.0.1:1/feed"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connect should fail"),
        }
    }
}
