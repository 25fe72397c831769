// Domain events widgets publish to the hosting page
//
// Each event type has a frozen detail shape. Fields are always present in
// the serialized detail, even when empty, so host listeners can destructure
// without guards. Changing a shape means introducing a new event type.

use crate::document::{CustomEvent, Document, EventTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const VIEW_CAPSULE: &str = "view-capsule";
pub const CAPSULE_CLICK: &str = "capsule-click";
pub const PROOF_ADDED: &str = "proof-added";
pub const UTID_COPIED: &str = "utid-copied";
pub const QR_SHOWN: &str = "qr-shown";
pub const ORB_CLICK: &str = "orb-click";

/// `view-capsule` detail
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCapsuleDetail {
    pub capsule_id: String,
    pub title: String,
    pub status: String,
}

/// `capsule-click` detail
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleClickDetail {
    pub capsule_id: String,
}

/// A proof record as streamed by the feed and published in `proof-added`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub id: String,
    pub proof_type: String,
    pub value: f64,
    #[serde(default)]
    pub source: String,
    /// Stamped on receipt, never taken from the wire
    #[serde(skip_deserializing, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

/// `utid-copied` / `qr-shown` detail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtidDetail {
    pub utid: String,
}

/// `orb-click` detail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbClickDetail {
    pub balance: f64,
    pub currency: String,
}

/// Every event a widget can publish
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    ViewCapsule(ViewCapsuleDetail),
    CapsuleClick(CapsuleClickDetail),
    ProofAdded(Proof),
    UtidCopied(UtidDetail),
    QrShown(UtidDetail),
    OrbClick(OrbClickDetail),
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ViewCapsule(_) => VIEW_CAPSULE,
            Self::CapsuleClick(_) => CAPSULE_CLICK,
            Self::ProofAdded(_) => PROOF_ADDED,
            Self::UtidCopied(_) => UTID_COPIED,
            Self::QrShown(_) => QR_SHOWN,
            Self::OrbClick(_) => ORB_CLICK,
        }
    }

    /// Serialized detail object
    pub fn detail(&self) -> serde_json::Value {
        let result = match self {
            Self::ViewCapsule(d) => serde_json::to_value(d),
            Self::CapsuleClick(d) => serde_json::to_value(d),
            Self::ProofAdded(d) => serde_json::to_value(d),
            Self::UtidCopied(d) | Self::QrShown(d) => serde_json::to_value(d),
            Self::OrbClick(d) => serde_json::to_value(d),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize {} detail: {}", self.event_type(), e);
            serde_json::Value::Null
        })
    }
}

/// Publishes events from one host element to the document
#[derive(Debug, Clone)]
pub struct EventEmitter {
    document: Document,
    target: EventTarget,
}

impl EventEmitter {
    pub fn new(document: Document, target: EventTarget) -> Self {
        Self { document, target }
    }

    /// Dispatch a bubbling, composed event. Returns listeners reached.
    pub fn emit(&self, event: DomainEvent) -> usize {
        let custom = CustomEvent {
            event_type: event.event_type().to_string(),
            detail: event.detail(),
            bubbles: true,
            composed: true,
            target: self.target.clone(),
            time_stamp: Utc::now(),
        };
        let delivered = self.document.dispatch(&custom);
        tracing::debug!(
            "<{}> {} emitted {} ({} listener(s))",
            self.target.tag,
            self.target.element,
            custom.event_type,
            delivered
        );
        delivered
    }
}
