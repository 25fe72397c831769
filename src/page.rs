// Page: the mounting surface for widgets
//
// Plays the role of the browser around the custom elements: upgrades tags
// through the registry, forwards attribute mutations, and owns the receive
// side of every realtime channel. All callbacks for an element run through
// `&mut Page`, so one element never sees two callbacks at once.
//
// Channel events are not pushed into widgets by the channel tasks. The page
// pulls them (`next_channel_event` / `drain_channel_events`) and routes each
// envelope to its element; envelopes for unmounted elements are dropped.

use crate::document::Document;
use crate::dom::is_valid_attribute_name;
use crate::error::WidgetError;
use crate::realtime::{
    ChannelEnvelope, ConnectionState, RealtimeConfig, Transport, WebSocketTransport,
};
use crate::theme::{Theme, ThemeProvider};
use crate::widget::{self, CustomElement, ElementId, HostContext};
use crate::widgets;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct Page {
    document: Document,
    theme: Arc<ThemeProvider>,
    transport: Arc<dyn Transport>,
    realtime: RealtimeConfig,
    /// Mount order is id order
    elements: BTreeMap<ElementId, Box<dyn CustomElement>>,
    channel_tx: mpsc::UnboundedSender<ChannelEnvelope>,
    channel_rx: mpsc::UnboundedReceiver<ChannelEnvelope>,
    live_channels: bool,
}

fn check_attribute_name(name: &str) -> Result<(), WidgetError> {
    if is_valid_attribute_name(name) {
        Ok(())
    } else {
        Err(WidgetError::InvalidAttributeName(name.to_string()))
    }
}

impl Page {
    /// Page using real WebSocket connections
    pub fn new(theme: Theme, realtime: RealtimeConfig) -> Self {
        Self::with_transport(theme, realtime, Arc::new(WebSocketTransport))
    }

    pub fn with_transport(
        theme: Theme,
        realtime: RealtimeConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        widgets::define_all();
        let (channel_tx, channel_rx) = mpsc::unbounded_channel();
        Self {
            document: Document::new(),
            theme: Arc::new(ThemeProvider::new(theme)),
            transport,
            realtime,
            elements: BTreeMap::new(),
            channel_tx,
            channel_rx,
            live_channels: true,
        }
    }

    /// Never open realtime channels. For pages that are only rendered to
    /// HTML: `ws-url` stays in the markup for the browser to dial.
    pub fn without_realtime(mut self) -> Self {
        self.live_channels = false;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn theme(&self) -> Arc<Theme> {
        self.theme.current()
    }

    fn host_context(&self) -> HostContext {
        HostContext {
            document: self.document.clone(),
            theme: self.theme.clone(),
            transport: self.transport.clone(),
            realtime: self.realtime,
            channel_sink: self.channel_tx.clone(),
            live_channels: self.live_channels,
        }
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Box<dyn CustomElement>, WidgetError> {
        self.elements
            .get_mut(&id)
            .ok_or(WidgetError::UnknownInstance(id.0))
    }

    /// Create, configure and connect an element.
    ///
    /// Attributes are applied before `connected_callback`, so the first
    /// render already reflects them and the channel (if any) opens once.
    pub fn mount(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<ElementId, WidgetError> {
        for (name, _) in attributes {
            check_attribute_name(name)?;
        }
        let id = ElementId::next();
        let mut element = widget::create_element(tag, id, self.host_context())?;
        for (name, value) in attributes {
            element.attribute_changed_callback(name, Some(value));
        }
        element.connected_callback();
        tracing::debug!("Mounted <{}> as {}", tag, id);
        self.elements.insert(id, element);
        Ok(id)
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), WidgetError> {
        check_attribute_name(name)?;
        self.element_mut(id)?
            .attribute_changed_callback(name, Some(value));
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<(), WidgetError> {
        check_attribute_name(name)?;
        self.element_mut(id)?.attribute_changed_callback(name, None);
        Ok(())
    }

    /// Disconnect and drop an element. Its channel closes without reconnecting.
    pub fn unmount(&mut self, id: ElementId) -> Result<(), WidgetError> {
        let mut element = self
            .elements
            .remove(&id)
            .ok_or(WidgetError::UnknownInstance(id.0))?;
        element.disconnected_callback();
        tracing::debug!("Unmounted <{}> {}", element.tag(), id);
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> Option<&dyn CustomElement> {
        self.elements.get(&id).map(|e| e.as_ref())
    }

    /// Concrete host of a mounted element, e.g. `page.host::<WidgetHost<ProofTicker>>(id)`
    pub fn host<H: 'static>(&self, id: ElementId) -> Option<&H> {
        self.element(id)?.as_any().downcast_ref::<H>()
    }

    pub fn elements(&self) -> impl Iterator<Item = &dyn CustomElement> {
        self.elements.values().map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replace the theme and re-render every element with it
    pub fn switch_theme(&mut self, theme: Theme) {
        self.theme.replace(theme);
        for element in self.elements.values_mut() {
            if element.is_connected() {
                element.render();
            }
        }
    }

    /// Deliver a DOM event to an element in a widget's shadow root
    pub fn dispatch_event(
        &mut self,
        id: ElementId,
        target_id: &str,
        event_type: &str,
    ) -> Result<bool, WidgetError> {
        Ok(self.element_mut(id)?.dispatch_event(target_id, event_type))
    }

    pub fn click(&mut self, id: ElementId, target_id: &str) -> Result<bool, WidgetError> {
        self.dispatch_event(id, target_id, "click")
    }

    pub fn connection_state(&self, id: ElementId) -> Option<ConnectionState> {
        self.element(id).map(|e| e.connection_state())
    }

    fn route(&mut self, envelope: ChannelEnvelope) -> Option<ElementId> {
        let id = envelope.element;
        match self.elements.get_mut(&id) {
            Some(element) => {
                element.handle_channel_event(envelope);
                Some(id)
            }
            None => {
                tracing::trace!("Dropping channel event for unmounted {}", id);
                None
            }
        }
    }

    /// Wait for the next channel envelope and route it.
    ///
    /// Returns the element it was addressed to, or `None` when it was
    /// addressed to an element that is no longer mounted.
    pub async fn next_channel_event(&mut self) -> Option<ElementId> {
        // The page holds a sender itself, so the channel never closes
        let envelope = self.channel_rx.recv().await?;
        self.route(envelope)
    }

    /// Route everything already queued without waiting
    pub fn drain_channel_events(&mut self) -> usize {
        let mut routed = 0;
        while let Ok(envelope) = self.channel_rx.try_recv() {
            self.route(envelope);
            routed += 1;
        }
        routed
    }

    /// Server-rendered HTML of every element, in mount order
    pub fn to_html(&self) -> String {
        self.elements
            .values()
            .map(|e| e.outer_html())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        for element in self.elements.values_mut() {
            element.disconnected_callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::mock::ScriptedTransport;
    use crate::theme::ThemeToken;
    use crate::widget::WidgetHost;
    use crate::widgets::{CapsuleCard, ProofTicker};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn page(transport: Arc<ScriptedTransport>) -> Page {
        Page::with_transport(Theme::fallback(), RealtimeConfig::default(), transport)
    }

    async fn wait_for_state(page: &mut Page, id: ElementId, state: ConnectionState) {
        while page.connection_state(id) != Some(state) {
            page.next_channel_event().await;
        }
    }

    #[test]
    fn test_mount_unknown_tag() {
        let mut page = page(ScriptedTransport::new());
        let err = page.mount("iv-nonexistent", &[]).unwrap_err();
        assert!(matches!(err, WidgetError::UnknownElement(tag) if tag == "iv-nonexistent"));
    }

    #[test]
    fn test_attribute_mutations_and_unknown_instance() {
        let mut page = page(ScriptedTransport::new());
        let id = page.mount("iv-capsule-card", &[("title", "One")]).unwrap();
        page.set_attribute(id, "title", "Two").unwrap();

        let card = page.host::<WidgetHost<CapsuleCard>>(id).unwrap();
        assert_eq!(card.shadow_root().find_by_class("title").unwrap().text_content(), "Two");

        page.unmount(id).unwrap();
        assert!(matches!(
            page.set_attribute(id, "title", "Three"),
            Err(WidgetError::UnknownInstance(_))
        ));
    }

    #[test]
    fn test_invalid_attribute_names_are_rejected() {
        let mut page = page(ScriptedTransport::new());
        let err = page
            .mount("iv-capsule-card", &[("x><script>alert(1)</script><y", "")])
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidAttributeName(ref name) if name.starts_with("x>")));
        assert!(page.is_empty());

        let id = page.mount("iv-capsule-card", &[("title", "One")]).unwrap();
        assert!(matches!(
            page.set_attribute(id, "onclick=\"x\"", "1"),
            Err(WidgetError::InvalidAttributeName(_))
        ));
        assert!(matches!(
            page.remove_attribute(id, ""),
            Err(WidgetError::InvalidAttributeName(_))
        ));
        let html = page.to_html();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("onclick"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_without_realtime_renders_without_connecting() {
        let transport = ScriptedTransport::new();
        let mut page = page(transport.clone()).without_realtime();
        let id = page
            .mount("iv-proof-ticker", &[("ws-url", "ws://feed/ws")])
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(page.drain_channel_events(), 0);
        assert_eq!(transport.attempts(), 0);
        assert_eq!(page.connection_state(id), Some(ConnectionState::Disconnected));

        let html = page.to_html();
        assert!(html.contains("ws-url=\"ws://feed/ws\""));
        assert!(page.element(id).unwrap().shadow_root().find_by_id("connection").is_none());
    }

    #[test]
    fn test_remount_is_a_fresh_instance() {
        let mut page = page(ScriptedTransport::new());
        let first = page.mount("iv-utid-badge", &[("utid", "U-1")]).unwrap();
        page.unmount(first).unwrap();
        let second = page.mount("iv-utid-badge", &[]).unwrap();
        assert_ne!(first, second);
        assert_eq!(page.element(second).unwrap().get_attribute("utid"), None);
    }

    #[test]
    fn test_switch_theme_rerenders_everything() {
        let mut page = page(ScriptedTransport::new());
        let card = page.mount("iv-capsule-card", &[("status", "critical")]).unwrap();
        page.mount("iv-wallet-orb", &[]).unwrap();

        let recoloured = Theme::fallback()
            .with_overrides("Alarm", [(ThemeToken::StatusError, "#ff00aa")])
            .unwrap();
        page.switch_theme(recoloured);

        assert_eq!(page.theme().get(ThemeToken::StatusError), "#ff00aa");
        let html = page.element(card).unwrap().outer_html();
        assert!(html.contains("border-left: 4px solid #ff00aa;"));
        for element in page.elements() {
            assert_eq!(element.render_passes(), 2);
        }
    }

    #[test]
    fn test_render_twice_is_identical() {
        let mut page = page(ScriptedTransport::new());
        page.mount("iv-capsule-card", &[("capsule-id", "c1"), ("priority", "P1")]).unwrap();
        page.mount("iv-utid-badge", &[("utid", "U-9"), ("verified", "")]).unwrap();
        let before = page.to_html();
        let theme = Theme::fallback();
        page.switch_theme(theme);
        assert_eq!(before, page.to_html());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_end_to_end_with_scripted_feed() {
        let transport = ScriptedTransport::new();
        let server = transport.accept();
        let mut page = page(transport.clone());
        let mut events = page.document().subscribe();

        let id = page
            .mount("iv-proof-ticker", &[("ws-url", "ws://feed/ws"), ("max-items", "3")])
            .unwrap();
        wait_for_state(&mut page, id, ConnectionState::Connected).await;

        server.send_text("{not json");
        for proof in ["a", "b", "c", "d"] {
            server.send_json(json!({
                "type": "proof_generated",
                "id": proof,
                "proofType": "execution",
                "value": 1.0,
                "source": "test"
            }));
        }
        for _ in 0..4 {
            page.next_channel_event().await;
        }

        let ticker = page.host::<WidgetHost<ProofTicker>>(id).unwrap();
        let ids: Vec<_> = ticker.widget().proofs().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["d", "c", "b"]);
        assert_eq!(page.connection_state(id), Some(ConnectionState::Connected));

        let rows = ticker.shadow_root().find_all_by_class("proof");
        assert_eq!(rows.len(), 3);

        let mut added = 0;
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.event_type, "proof-added");
            added += 1;
        }
        assert_eq!(added, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_reconnecting() {
        let transport = ScriptedTransport::new();
        let mut page = page(transport.clone());
        let id = page.mount("iv-wallet-orb", &[("ws-url", "ws://down")]).unwrap();
        wait_for_state(&mut page, id, ConnectionState::Error).await;

        page.unmount(id).unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(transport.attempts(), 1);
        // Late envelopes for the removed element are dropped
        page.drain_channel_events();
        assert!(page.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_ws_url_closes_channel() {
        let transport = ScriptedTransport::new();
        let _server = transport.accept();
        let mut page = page(transport.clone());
        let id = page.mount("iv-utid-badge", &[("ws-url", "ws://feed")]).unwrap();
        wait_for_state(&mut page, id, ConnectionState::Connected).await;

        page.remove_attribute(id, "ws-url").unwrap();
        assert_eq!(page.connection_state(id), Some(ConnectionState::Disconnected));
        tokio::time::sleep(Duration::from_secs(60)).await;
        page.drain_channel_events();
        assert_eq!(page.connection_state(id), Some(ConnectionState::Disconnected));
        assert_eq!(transport.attempts(), 1);
        assert!(page.element(id).unwrap().shadow_root().find_by_id("connection").is_none());
    }
}
