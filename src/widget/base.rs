//! Capability traits implemented by concrete widgets

use super::attributes::{AttributeValue, WidgetSchema};
use super::events::EventEmitter;
use super::render::RenderContext;
use crate::dom::{Node, ShadowRoot};
use crate::theme::Theme;

/// Whether a callback changed anything the user can see
///
/// Tells the host whether to run a render pass after the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// State changed, re-render
    Render,
    /// Nothing visible changed
    None,
}

impl Update {
    pub fn from_bool(changed: bool) -> Self {
        if changed {
            Self::Render
        } else {
            Self::None
        }
    }

    pub fn needs_render(self) -> bool {
        self == Self::Render
    }
}

impl From<bool> for Update {
    fn from(changed: bool) -> Self {
        Self::from_bool(changed)
    }
}

/// Produces the widget's shadow content.
///
/// A render is always a full replacement: `render` builds a brand-new subtree
/// and `attach_event_listeners` binds actions onto it afterwards, because
/// bindings on the previous subtree are gone.
pub trait Renderable {
    /// Widget-specific CSS with theme values interpolated
    fn styles(&self, theme: &Theme) -> String;

    /// Fresh subtree for the current state
    fn render(&self, ctx: &RenderContext) -> Vec<Node>;

    /// Bind actions onto the freshly rendered subtree
    fn attach_event_listeners(&self, _root: &mut ShadowRoot) {}
}

/// Receives typed attribute values
pub trait AttributeReactive {
    /// Observed attributes with kinds and defaults
    fn schema() -> &'static WidgetSchema
    where
        Self: Sized;

    /// Store a typed value. Called for every observed attribute at upgrade
    /// (with its default) and on every later mutation.
    fn handle_attribute_change(&mut self, name: &str, value: &AttributeValue);

    /// Whether a change to `name` warrants a full render pass
    fn should_rerender(&self, _name: &str) -> bool {
        true
    }
}

/// Consumes decoded realtime payloads.
///
/// The channel only guarantees the payload is JSON; the widget decides what
/// the `type` discriminator means and ignores what it doesn't know.
pub trait RealtimeConsumer {
    fn on_websocket_message(&mut self, _payload: &serde_json::Value, _emitter: &EventEmitter) -> Update {
        Update::None
    }

    /// Whether connection state changes are shown (and so need a render)
    fn renders_connection_state(&self) -> bool {
        false
    }
}

/// Handles actions bound by `attach_event_listeners`
pub trait Interactive {
    fn handle_action(&mut self, _action: &str, _emitter: &EventEmitter) -> Update {
        Update::None
    }
}

/// A complete custom element implementation
pub trait Widget:
    Renderable + AttributeReactive + RealtimeConsumer + Interactive + Send + 'static
{
    /// Custom element tag name
    const TAG: &'static str;

    /// Fresh instance with default state (attributes are applied afterwards)
    fn create() -> Self
    where
        Self: Sized;
}
