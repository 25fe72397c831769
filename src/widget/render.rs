//! Shadow renderer: full-replacement render passes into a shadow root

use super::ElementId;
use crate::dom::{Element, Node, ShadowRoot};
use crate::realtime::ConnectionState;
use crate::theme::Theme;

/// Immutable context passed to widgets during rendering
///
/// Widgets only see what they need - no access to host internals.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub element: ElementId,
    /// `None` when the widget has no realtime channel
    pub connection: Option<ConnectionState>,
}

/// Owns a widget's shadow root
#[derive(Debug, Default)]
pub struct ShadowRenderer {
    root: ShadowRoot,
    passes: u64,
}

impl ShadowRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shadow content: one `<style>` (theme prelude + widget
    /// rules) followed by the widget's subtree.
    pub fn render(&mut self, theme: &Theme, widget_css: &str, body: Vec<Node>) {
        self.root.clear();

        let mut css = String::from(&*theme.css_prelude());
        css.push_str(widget_css);
        self.root.append(Element::new("style").text(css));

        for node in body {
            self.root.append(node);
        }
        self.passes += 1;
    }

    pub fn root(&self) -> &ShadowRoot {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ShadowRoot {
        &mut self.root
    }

    /// Number of completed render passes
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
