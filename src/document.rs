// Hosting document - the event target widgets publish to
//
// Widgets dispatch CustomEvents from their host element. With `bubbles` and
// `composed` set, the event crosses the shadow boundary and reaches
// listeners registered on the document. This module models that last hop:
// a listener registry plus dispatch.
//
// Listeners are invoked outside the registry lock, so a listener may add or
// remove listeners while handling an event.

use crate::widget::ElementId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Element an event was dispatched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTarget {
    pub tag: &'static str,
    pub element: ElementId,
}

/// A dispatched DOM event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub detail: serde_json::Value,
    pub bubbles: bool,
    pub composed: bool,
    pub target: EventTarget,
    pub time_stamp: DateTime<Utc>,
}

/// Handle returned by `add_event_listener`, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&CustomEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    /// `None` listens to every event type
    event_type: Option<String>,
    callback: Callback,
}

/// The page's document. Cheap to clone; clones share listeners.
#[derive(Clone, Default)]
pub struct Document {
    listeners: Arc<Mutex<Vec<Registration>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("listeners", &self.lock().len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registration>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_listener_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, id: ListenerId, event_type: Option<String>, callback: Callback) {
        self.lock().push(Registration {
            id,
            event_type,
            callback,
        });
    }

    fn register(&self, event_type: Option<String>, callback: Callback) -> ListenerId {
        let id = self.next_listener_id();
        self.insert(id, event_type, callback);
        id
    }

    /// Listen for one event type
    pub fn add_event_listener<F>(&self, event_type: &str, callback: F) -> ListenerId
    where
        F: Fn(&CustomEvent) + Send + Sync + 'static,
    {
        self.register(Some(event_type.to_string()), Arc::new(callback))
    }

    /// Listen for every event type
    pub fn add_any_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&CustomEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(callback))
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }

    /// Forward every event into a channel (for async consumers)
    ///
    /// The registration removes itself on the first event after the
    /// receiver is dropped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CustomEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_listener_id();
        let listeners = Arc::downgrade(&self.listeners);
        let forward = move |event: &CustomEvent| {
            if tx.send(event.clone()).is_ok() {
                return;
            }
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .retain(|r| r.id != id);
            }
        };
        self.insert(id, None, Arc::new(forward));
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Deliver an event to matching document listeners.
    ///
    /// Non-bubbling events never leave their host element, so they reach no
    /// document listener. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &CustomEvent) -> usize {
        if !event.bubbles {
            return 0;
        }

        let callbacks: Vec<Callback> = self
            .lock()
            .iter()
            .filter(|r| {
                r.event_type
                    .as_deref()
                    .map_or(true, |t| t == event.event_type)
            })
            .map(|r| r.callback.clone())
            .collect();

        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }
}
