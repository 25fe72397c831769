//! Widget framework: the shared contract every `iv-*` element builds on
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WidgetHost<W: Widget>                    │
//! │ (lifecycle: upgrade, attribute changes, channel, teardown)  │
//! └─────────────────────────────────────────────────────────────┘
//!        │               │               │               │
//!        ▼               ▼               ▼               ▼
//!  ┌───────────┐  ┌────────────┐  ┌─────────────┐  ┌────────────┐
//!  │ Attribute │  │   Shadow   │  │  Realtime   │  │   Event    │
//!  │  Binder   │  │  Renderer  │  │  Channel    │  │  Emitter   │
//!  └───────────┘  └────────────┘  └─────────────┘  └────────────┘
//! ```
//!
//! Concrete widgets implement small capability traits instead of extending
//! a base class:
//!
//! - [`Renderable`] - styles + fresh subtree per render pass
//! - [`AttributeReactive`] - typed attribute intake and re-render policy
//! - [`RealtimeConsumer`] - inbound feed payloads
//! - [`Interactive`] - actions bound to rendered elements
//!
//! [`WidgetHost`] composes them; [`CustomElement`] erases the widget type so
//! the registry and the page can hold any widget.

mod attributes;
mod base;
mod buffer;
mod embed;
mod events;
mod host;
mod registry;
mod render;

pub use attributes::{AttributeBinder, AttributeKind, AttributeSpec, AttributeValue, WidgetSchema};
pub use base::{AttributeReactive, Interactive, RealtimeConsumer, Renderable, Update, Widget};
pub use buffer::BoundedBuffer;
pub use embed::{embed_code, embed_code_for_tag, kebab_to_camel};
pub use events::{
    CapsuleClickDetail, DomainEvent, EventEmitter, OrbClickDetail, Proof, UtidDetail,
    ViewCapsuleDetail, CAPSULE_CLICK, ORB_CLICK, PROOF_ADDED, QR_SHOWN, UTID_COPIED, VIEW_CAPSULE,
};
pub use host::{CustomElement, HostContext, WidgetHost};
pub use registry::{create_element, define, defined_tags, lookup, ElementDefinition};
pub use render::{RenderContext, ShadowRenderer};

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one mounted element instance.
///
/// Every mount gets a fresh id, so nothing addressed to a previous instance
/// of the same tag can reach the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub u64);

impl ElementId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
