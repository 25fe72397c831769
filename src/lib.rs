//! iv-widgets: headless runtime for embeddable `iv-*` custom element widgets
//!
//! Widgets are custom elements with typed attributes, an isolated shadow
//! tree, optional realtime WebSocket feeds and DOM-style events. A [`Page`]
//! plays the browser: it mounts elements by tag, forwards attribute
//! mutations and routes realtime frames to the right element.
//!
//! ```no_run
//! # async fn demo() -> Result<(), iv_widgets::WidgetError> {
//! use iv_widgets::{Page, RealtimeConfig, Theme};
//!
//! let mut page = Page::new(Theme::by_name("IV Dark"), RealtimeConfig::default());
//! let ticker = page.mount("iv-proof-ticker", &[("ws-url", "ws://localhost:8787/feed")])?;
//! loop {
//!     // `None`: the envelope was for an element that has since been unmounted
//!     if page.next_channel_event().await == Some(ticker) {
//!         println!("{}", page.to_html());
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod demo;
pub mod document;
pub mod dom;
pub mod error;
pub mod logging;
pub mod page;
pub mod realtime;
pub mod server;
pub mod theme;
pub mod widget;
pub mod widgets;

pub use document::{CustomEvent, Document, EventTarget};
pub use error::{DecodeError, ThemeError, TransportError, WidgetError};
pub use page::Page;
pub use realtime::{ConnectionState, RealtimeConfig};
pub use theme::{Theme, ThemeProvider, ThemeToken};
pub use widget::{CustomElement, ElementId, Widget, WidgetHost};

#[cfg(test)]
pub(crate) mod testing {
    use crate::document::Document;
    use crate::realtime::mock::ScriptedTransport;
    use crate::realtime::{ChannelEnvelope, RealtimeConfig};
    use crate::theme::{Theme, ThemeProvider};
    use crate::widget::HostContext;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Host context over a scripted transport, with the channel receiver
    pub fn host_context() -> (HostContext, mpsc::UnboundedReceiver<ChannelEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = HostContext {
            document: Document::new(),
            theme: Arc::new(ThemeProvider::new(Theme::fallback())),
            transport: ScriptedTransport::new(),
            realtime: RealtimeConfig::default(),
            channel_sink: tx,
            live_channels: true,
        };
        (ctx, rx)
    }
}
