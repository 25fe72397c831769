// Custom element registry
//
// Process-wide, like `window.customElements`. Defining a tag twice is a
// no-op: the first definition wins and later calls report false, so every
// widget module can register itself without coordinating load order.

use super::attributes::WidgetSchema;
use super::base::Widget;
use super::host::{CustomElement, HostContext, WidgetHost};
use super::ElementId;
use crate::error::WidgetError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

type Factory = fn(ElementId, HostContext) -> Box<dyn CustomElement>;

/// A registered element type
#[derive(Clone, Copy)]
pub struct ElementDefinition {
    pub tag: &'static str,
    pub schema: &'static WidgetSchema,
    factory: Factory,
}

impl ElementDefinition {
    /// Construct (upgrade) a new instance
    pub fn create(&self, id: ElementId, ctx: HostContext) -> Box<dyn CustomElement> {
        (self.factory)(id, ctx)
    }
}

impl std::fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("tag", &self.tag)
            .finish()
    }
}

fn instantiate<W: Widget>(id: ElementId, ctx: HostContext) -> Box<dyn CustomElement> {
    Box::new(WidgetHost::<W>::new(id, ctx))
}

fn registry() -> MutexGuard<'static, BTreeMap<&'static str, ElementDefinition>> {
    static REGISTRY: OnceLock<Mutex<BTreeMap<&'static str, ElementDefinition>>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Mutex::new(BTreeMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register `W` under its tag. Returns false if the tag was already taken.
pub fn define<W: Widget>() -> bool {
    let mut registry = registry();
    if registry.contains_key(W::TAG) {
        tracing::trace!("<{}> already defined", W::TAG);
        return false;
    }
    registry.insert(
        W::TAG,
        ElementDefinition {
            tag: W::TAG,
            schema: W::schema(),
            factory: instantiate::<W>,
        },
    );
    tracing::debug!("Defined <{}>", W::TAG);
    true
}

pub fn lookup(tag: &str) -> Option<ElementDefinition> {
    registry().get(tag).copied()
}

/// Create an instance of a registered tag
pub fn create_element(
    tag: &str,
    id: ElementId,
    ctx: HostContext,
) -> Result<Box<dyn CustomElement>, WidgetError> {
    let definition = lookup(tag).ok_or_else(|| WidgetError::UnknownElement(tag.to_string()))?;
    Ok(definition.create(id, ctx))
}

/// Every defined tag, sorted
pub fn defined_tags() -> Vec<&'static str> {
    registry().keys().copied().collect()
}
