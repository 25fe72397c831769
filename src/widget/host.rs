//! Widget host: lifecycle of one custom element instance
//!
//! Mirrors the custom element callbacks a browser would deliver:
//!
//! 1. Construction (upgrade): every observed attribute is applied with its
//!    default so the widget is fully typed before anything else happens.
//! 2. `attribute_changed_callback`: raw value -> binder -> widget. Re-renders
//!    when connected and the widget asks for it. A `ws-url` change replaces
//!    the channel.
//! 3. `connected_callback`: first render, then the channel opens.
//! 4. `disconnected_callback`: the channel closes on purpose; no reconnect.
//!
//! Channel envelopes carry the generation of the channel that produced them.
//! Anything from a replaced or closed channel is dropped here, so a widget
//! never sees data meant for a previous configuration.

use super::attributes::{AttributeBinder, AttributeValue};
use super::base::{Update, Widget};
use super::events::EventEmitter;
use super::render::{RenderContext, ShadowRenderer};
use super::ElementId;
use crate::document::{Document, EventTarget};
use crate::dom::{escape_attribute, is_valid_attribute_name, ShadowRoot};
use crate::realtime::{
    ChannelEnvelope, ChannelEvent, ChannelSink, ConnectionState, RealtimeChannel, RealtimeConfig,
    Transport,
};
use crate::theme::ThemeProvider;
use std::any::Any;
use std::sync::Arc;

/// The attribute that configures a widget's realtime channel
pub const WS_URL_ATTRIBUTE: &str = "ws-url";

/// Page-level services every host needs
#[derive(Clone)]
pub struct HostContext {
    pub document: Document,
    pub theme: Arc<ThemeProvider>,
    pub transport: Arc<dyn Transport>,
    pub realtime: RealtimeConfig,
    pub channel_sink: ChannelSink,
    /// Off for server-side rendering: `ws-url` is kept but never dialled
    pub live_channels: bool,
}

/// Type-erased element, as held by the page and created by the registry
pub trait CustomElement: Send {
    fn id(&self) -> ElementId;
    fn tag(&self) -> &'static str;

    fn attribute_changed_callback(&mut self, name: &str, value: Option<&str>);
    fn connected_callback(&mut self);
    fn disconnected_callback(&mut self);
    fn is_connected(&self) -> bool;

    /// Route an envelope from this element's channel
    fn handle_channel_event(&mut self, envelope: ChannelEnvelope);

    /// Full render pass with the current theme
    fn render(&mut self);

    /// Deliver a DOM event (e.g. `click`) to the shadow element with this id.
    /// Returns false when nothing there listens for it.
    fn dispatch_event(&mut self, target_id: &str, event_type: &str) -> bool;

    fn get_attribute(&self, name: &str) -> Option<&str>;
    fn typed_attribute(&self, name: &str) -> Option<&AttributeValue>;
    fn binder(&self) -> &AttributeBinder;
    fn connection_state(&self) -> ConnectionState;
    fn shadow_root(&self) -> &ShadowRoot;
    fn render_passes(&self) -> u64;

    /// Host element with declarative shadow DOM
    fn outer_html(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Owns a widget and everything around it
pub struct WidgetHost<W: Widget> {
    id: ElementId,
    widget: W,
    binder: AttributeBinder,
    /// Raw attributes in insertion order, observed or not
    attributes: Vec<(String, String)>,
    renderer: ShadowRenderer,
    emitter: EventEmitter,
    ctx: HostContext,
    channel: Option<RealtimeChannel>,
    generation: u64,
    connection: ConnectionState,
    connected: bool,
}

impl<W: Widget> WidgetHost<W> {
    /// Upgrade: create the widget and apply every default
    pub fn new(id: ElementId, ctx: HostContext) -> Self {
        let schema = W::schema();
        let binder = AttributeBinder::new(schema);
        let mut widget = W::create();
        for (spec, value) in binder.values() {
            widget.handle_attribute_change(spec.name, value);
        }

        let emitter = EventEmitter::new(
            ctx.document.clone(),
            EventTarget {
                tag: W::TAG,
                element: id,
            },
        );

        Self {
            id,
            widget,
            binder,
            attributes: Vec::new(),
            renderer: ShadowRenderer::new(),
            emitter,
            ctx,
            channel: None,
            generation: 0,
            connection: ConnectionState::Disconnected,
            connected: false,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Generation of the current (or last) channel
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    fn store_raw(&mut self, name: &str, value: Option<&str>) -> Option<String> {
        let position = self.attributes.iter().position(|(n, _)| n == name);
        match (position, value) {
            (Some(i), Some(v)) => Some(std::mem::replace(&mut self.attributes[i].1, v.to_string())),
            (Some(i), None) => Some(self.attributes.remove(i).1),
            (None, Some(v)) => {
                self.attributes.push((name.to_string(), v.to_string()));
                None
            }
            (None, None) => None,
        }
    }

    fn ws_url(&self) -> Option<String> {
        self.binder
            .value(WS_URL_ATTRIBUTE)
            .and_then(|v| v.as_text())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    /// Close the current channel (if any) and open one for the current url
    fn reconnect(&mut self) {
        self.close_channel();
        let Some(url) = self.ws_url() else {
            return;
        };
        if !self.ctx.live_channels {
            tracing::debug!("<{}> {} realtime disabled; not dialling {}", W::TAG, self.id, url);
            return;
        }

        self.generation += 1;
        self.connection = ConnectionState::Connecting;
        tracing::info!("<{}> {} opening channel to {}", W::TAG, self.id, url);
        self.channel = Some(RealtimeChannel::open(
            &url,
            self.id,
            self.generation,
            self.ctx.transport.clone(),
            self.ctx.realtime,
            self.ctx.channel_sink.clone(),
        ));
    }

    fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            tracing::debug!("<{}> {} closing channel to {}", W::TAG, self.id, channel.url());
            channel.close();
            self.connection = ConnectionState::Disconnected;
        }
    }

    fn render_pass(&mut self) {
        let theme = self.ctx.theme.current();
        let ctx = RenderContext {
            theme: &theme,
            element: self.id,
            connection: self.channel.as_ref().map(|_| self.connection),
        };
        let css = self.widget.styles(&theme);
        let body = self.widget.render(&ctx);
        self.renderer.render(&theme, &css, body);
        self.widget.attach_event_listeners(self.renderer.root_mut());
    }
}

impl<W: Widget> CustomElement for WidgetHost<W> {
    fn id(&self) -> ElementId {
        self.id
    }

    fn tag(&self) -> &'static str {
        W::TAG
    }

    fn attribute_changed_callback(&mut self, name: &str, value: Option<&str>) {
        if !is_valid_attribute_name(name) {
            tracing::debug!("<{}> {} ignoring invalid attribute name {:?}", W::TAG, self.id, name);
            return;
        }
        let old = self.store_raw(name, value);
        if old.as_deref() == value {
            return;
        }

        let Some(typed) = self.binder.apply(name, value) else {
            return;
        };
        tracing::debug!("<{}> {} {} = {}", W::TAG, self.id, name, typed);
        self.widget.handle_attribute_change(name, typed);

        if !self.connected {
            return;
        }
        if name == WS_URL_ATTRIBUTE {
            // The connection indicator changes with the channel
            self.reconnect();
            self.render_pass();
        } else if self.widget.should_rerender(name) {
            self.render_pass();
        }
    }

    fn connected_callback(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;
        self.render_pass();
        self.reconnect();
        if self.channel.is_some() {
            // Show the connecting state straight away
            self.render_pass();
        }
    }

    fn disconnected_callback(&mut self) {
        self.connected = false;
        self.close_channel();
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn handle_channel_event(&mut self, envelope: ChannelEnvelope) {
        if envelope.element != self.id
            || envelope.generation != self.generation
            || self.channel.is_none()
        {
            tracing::trace!(
                "<{}> {} dropping stale channel event (generation {} vs {})",
                W::TAG,
                self.id,
                envelope.generation,
                self.generation
            );
            return;
        }

        let update = match envelope.event {
            ChannelEvent::State(state) => {
                if state == self.connection {
                    return;
                }
                self.connection = state;
                Update::from(self.widget.renders_connection_state())
            }
            ChannelEvent::Message(payload) => {
                self.widget.on_websocket_message(&payload, &self.emitter)
            }
        };
        if update.needs_render() && self.connected {
            self.render_pass();
        }
    }

    fn render(&mut self) {
        self.render_pass();
    }

    fn dispatch_event(&mut self, target_id: &str, event_type: &str) -> bool {
        let action = self
            .renderer
            .root()
            .find_by_id(target_id)
            .and_then(|el| el.listener_for(event_type))
            .map(str::to_string);
        let Some(action) = action else {
            return false;
        };

        tracing::debug!("<{}> {} {} on #{} -> {}", W::TAG, self.id, event_type, target_id, action);
        if self.widget.handle_action(&action, &self.emitter).needs_render() {
            self.render_pass();
        }
        true
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn typed_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.binder.value(name)
    }

    fn binder(&self) -> &AttributeBinder {
        &self.binder
    }

    fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    fn shadow_root(&self) -> &ShadowRoot {
        self.renderer.root()
    }

    fn render_passes(&self) -> u64 {
        self.renderer.passes()
    }

    fn outer_html(&self) -> String {
        let mut out = format!("<{}", W::TAG);
        for (name, value) in &self.attributes {
            if value.is_empty() {
                out.push_str(&format!(" {}", name));
            } else {
                out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
            }
        }
        out.push('>');
        out.push_str(&self.renderer.root().to_template_html());
        out.push_str(&format!("</{}>", W::TAG));
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<W: Widget> Drop for WidgetHost<W> {
    fn drop(&mut self) {
        self.close_channel();
    }
}
