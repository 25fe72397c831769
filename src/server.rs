// Demo server - serves a page of widgets and the feed they subscribe to
//
// Routes:
// - GET /        server-rendered demo page (declarative shadow DOM)
// - GET /feed    WebSocket pushing demo frames to every subscriber
// - GET /health  liveness and subscriber count
//
// The feed itself is produced elsewhere (see `demo::run_demo`); this module
// only fans out whatever arrives on the broadcast channel.

use crate::config::VERSION;
use crate::page::Page;
use crate::realtime::RealtimeConfig;
use crate::theme::{Theme, ThemeToken};
use anyhow::{Context, Result};
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};

/// Shared state for the demo server
#[derive(Clone)]
pub struct ServerState {
    /// Demo frames, fanned out to every /feed socket
    pub feed: broadcast::Sender<Value>,
    /// Theme name the demo page renders with
    pub theme: String,
    pub realtime: RealtimeConfig,
    /// Used for the feed URL when the request has no Host header
    pub bind_addr: SocketAddr,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/feed", get(feed_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the demo server on the configured address
pub async fn start_server(state: ServerState, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
    let bind_addr = state.bind_addr;
    tracing::info!("Starting demo server on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    serve(listener, state, shutdown_rx).await
}

/// Serve on an already-bound listener until shutdown is signalled
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Demo server listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Demo server shut down gracefully");
    Ok(())
}

// ─── Handlers ───

async fn page_handler(State(state): State<ServerState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.bind_addr.to_string());

    match render_demo_page(&state, &format!("ws://{}/feed", host)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render demo page: {}", e);
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Full HTML document with one of each widget wired to `feed_url`
pub fn render_demo_page(state: &ServerState, feed_url: &str) -> Result<String> {
    let theme = Theme::by_name(&state.theme);
    let background = theme.get(ThemeToken::SurfaceBase).to_string();
    let foreground = theme.get(ThemeToken::TextPrimary).to_string();
    let font = theme.get(ThemeToken::FontSans).to_string();

    let mut page = Page::new(theme, state.realtime).without_realtime();
    page.mount(
        "iv-capsule-card",
        &[
            ("capsule-id", "cap-001"),
            ("title", "Orbital Telemetry"),
            ("status", "active"),
            ("priority", "P2"),
            ("source", "iv-demo"),
            ("description", "Live capsule fed by the demo stream"),
        ],
    )?;
    page.mount("iv-proof-ticker", &[("ws-url", feed_url), ("max-items", "8")])?;
    page.mount(
        "iv-utid-badge",
        &[("utid", crate::demo::DEMO_UTID), ("ws-url", feed_url)],
    )?;
    page.mount("iv-wallet-orb", &[("ws-url", feed_url), ("show-balance", "")])?;

    Ok(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>iv-widgets demo</title>
<style>body {{ background: {bg}; color: {fg}; font-family: {font}; display: grid; gap: 16px; padding: 24px; }}</style>
</head>
<body>
{widgets}
</body>
</html>
"#,
        bg = background,
        fg = foreground,
        font = font,
        widgets = page.to_html(),
    ))
}

async fn feed_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    let rx = state.feed.subscribe();
    ws.on_upgrade(move |socket| handle_feed_socket(socket, rx))
}

async fn handle_feed_socket(mut socket: WebSocket, mut rx: broadcast::Receiver<Value>) {
    tracing::debug!("Feed subscriber connected");
    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Ok(frame) => {
                    if socket.send(Message::Text(frame.to_string())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Feed subscriber lagged, skipped {} frames", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                // Clients don't talk to the feed; only watch for hangups
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Feed subscriber disconnected");
}

async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "theme": state.theme,
        "subscribers": state.feed.receiver_count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ConnectionState;
    use crate::widget::WidgetHost;
    use crate::widgets::ProofTicker;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn spawn_server() -> (SocketAddr, broadcast::Sender<Value>, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (feed, _) = broadcast::channel(64);
        let state = ServerState {
            feed: feed.clone(),
            theme: crate::theme::DEFAULT_THEME.to_string(),
            realtime: RealtimeConfig::default(),
            bind_addr: addr,
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(serve(listener, state, shutdown_rx));
        (addr, feed, shutdown_tx)
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_health() {
        let (addr, _feed, shutdown) = spawn_server().await;
        let response = http_get(addr, "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#""status":"ok""#));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn test_demo_page_is_server_rendered() {
        let (addr, _feed, shutdown) = spawn_server().await;
        let response = http_get(addr, "/").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        for tag in ["iv-capsule-card", "iv-proof-ticker", "iv-utid-badge", "iv-wallet-orb"] {
            assert!(response.contains(&format!("<{}", tag)), "missing <{}>", tag);
        }
        assert!(response.contains(r#"<template shadowrootmode="open">"#));
        assert!(response.contains(&format!("ws://{}/feed", addr)));
        let _ = shutdown.send(());
    }

    #[test]
    fn test_demo_page_opens_no_connections() {
        let (feed, _) = broadcast::channel(4);
        let state = ServerState {
            feed,
            theme: crate::theme::DEFAULT_THEME.to_string(),
            realtime: RealtimeConfig::default(),
            bind_addr: "127.0.0.1:9".parse().unwrap(),
        };
        // No runtime here: a channel task would have nowhere to spawn
        let html = render_demo_page(&state, "ws://127.0.0.1:9/feed").unwrap();
        assert_eq!(html.matches(r#"ws-url="ws://127.0.0.1:9/feed""#).count(), 3);
        assert!(!html.contains(r#"id="connection""#));
    }

    #[tokio::test]
    async fn test_ticker_receives_proofs_over_real_websocket() {
        let (addr, feed, shutdown) = spawn_server().await;
        let mut page = Page::new(Theme::fallback(), RealtimeConfig::default());
        let url = format!("ws://{}/feed", addr);
        let id = page.mount("iv-proof-ticker", &[("ws-url", url.as_str())]).unwrap();

        let frame = json!({
            "type": "proof_generated",
            "id": "loopback-1",
            "proofType": "execution",
            "value": 3.25,
            "source": "loopback"
        });

        let received = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                // The server subscribes after the upgrade completes, so keep
                // offering the frame until one lands
                let _ = feed.send(frame.clone());
                let _ = tokio::time::timeout(Duration::from_millis(50), page.next_channel_event())
                    .await;
                let ticker = page.host::<WidgetHost<ProofTicker>>(id).unwrap();
                if ticker.widget().received() > 0 {
                    break ticker.widget().proofs().next().map(|p| p.id.clone());
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(received.as_deref(), Some("loopback-1"));
        assert_eq!(page.connection_state(id), Some(ConnectionState::Connected));
        let _ = shutdown.send(());
    }
}
