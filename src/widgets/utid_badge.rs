// iv-utid-badge: identity badge for a UTID
//
// Attributes give the initial picture; `utid_update` frames patch it live.
// A frame naming a different UTID is not for this badge and is ignored.

use super::{connection_css, connection_indicator, decode_frame};
use crate::dom::{Element, Node, ShadowRoot};
use crate::theme::Theme;
use crate::widget::{
    AttributeReactive, AttributeSpec, AttributeValue, DomainEvent, EventEmitter, Interactive,
    RealtimeConsumer, RenderContext, Renderable, Update, UtidDetail, Widget, WidgetSchema,
};
use serde::Deserialize;

static SCHEMA: WidgetSchema = WidgetSchema {
    tag: "iv-utid-badge",
    attributes: &[
        AttributeSpec::text("utid", ""),
        AttributeSpec::boolean("verified", false),
        AttributeSpec::text("blockchain-hash", ""),
        AttributeSpec::number("consciousness-level", 0.0, Some(0.0), Some(100.0)),
        AttributeSpec::text("physics-domain", ""),
        AttributeSpec::text("ws-url", ""),
    ],
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtidUpdate {
    utid: Option<String>,
    verified: Option<bool>,
    blockchain_hash: Option<String>,
    consciousness_level: Option<f64>,
    physics_domain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BadgeFrame {
    UtidUpdate(UtidUpdate),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default)]
pub struct UtidBadge {
    utid: String,
    verified: bool,
    blockchain_hash: String,
    consciousness_level: f64,
    physics_domain: String,
    qr_visible: bool,
}

impl UtidBadge {
    pub fn utid(&self) -> &str {
        &self.utid
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn consciousness_level(&self) -> f64 {
        self.consciousness_level
    }

    pub fn qr_visible(&self) -> bool {
        self.qr_visible
    }

    fn apply_update(&mut self, update: UtidUpdate) -> bool {
        if let Some(utid) = &update.utid {
            if !self.utid.is_empty() && *utid != self.utid {
                tracing::trace!("<{}> ignoring update for {}", SCHEMA.tag, utid);
                return false;
            }
            self.utid = utid.clone();
        }
        if let Some(verified) = update.verified {
            self.verified = verified;
        }
        if let Some(hash) = update.blockchain_hash {
            self.blockchain_hash = hash;
        }
        if let Some(level) = update.consciousness_level.filter(|l| l.is_finite()) {
            self.consciousness_level = level.clamp(0.0, 100.0);
        }
        if let Some(domain) = update.physics_domain {
            self.physics_domain = domain;
        }
        true
    }
}

/// `0x1234567890abcdef` -> `0x1234…cdef`
fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 12 {
        return hash.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

impl Renderable for UtidBadge {
    fn styles(&self, _theme: &Theme) -> String {
        format!(
            r#"
.badge {{
  display: inline-flex;
  flex-direction: column;
  gap: var(--iv-spacing-xs);
  font-family: var(--iv-font-sans);
  background: var(--iv-surface-raised);
  color: var(--iv-text-primary);
  border: 1px solid var(--iv-border-subtle);
  border-radius: var(--iv-radius-md);
  padding: var(--iv-spacing-sm) var(--iv-spacing-md);
}}
.badge.verified {{ border-color: var(--iv-status-success); }}
.utid {{ font-family: var(--iv-font-mono); font-size: 14px; }}
.utid.empty {{ color: var(--iv-text-muted); }}
.verification {{ font-size: 12px; color: var(--iv-text-muted); }}
.verified .verification {{ color: var(--iv-status-success); }}
.meter {{ height: 4px; background: var(--iv-border-subtle); border-radius: var(--iv-radius-full); }}
.meter-fill {{ height: 100%; background: var(--iv-brand-secondary); border-radius: var(--iv-radius-full); }}
.level, .domain, .hash {{ font-size: 12px; color: var(--iv-text-secondary); }}
.hash {{ font-family: var(--iv-font-mono); }}
.actions {{ display: flex; gap: var(--iv-spacing-xs); }}
.actions button {{
  background: transparent;
  color: var(--iv-brand-primary);
  border: 1px solid var(--iv-border-strong);
  border-radius: var(--iv-radius-sm);
  cursor: pointer;
}}
.qr-panel {{
  background: var(--iv-surface-overlay);
  border-radius: var(--iv-radius-sm);
  padding: var(--iv-spacing-sm);
  text-align: center;
}}
.qr-payload {{ font-family: var(--iv-font-mono); word-break: break-all; }}
{}"#,
            connection_css()
        )
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Node> {
        let utid = if self.utid.is_empty() {
            Element::new("span").id("utid").class("utid empty").text("No UTID")
        } else {
            Element::new("span").id("utid").class("utid").text(self.utid.as_str())
        };
        let verification = if self.verified { "✓ Verified" } else { "Unverified" };

        let mut badge = Element::new("div")
            .class(if self.verified { "badge verified" } else { "badge" })
            .child(utid)
            .child(Element::new("span").class("verification").text(verification))
            .child(
                Element::new("div")
                    .class("meter")
                    .attr("role", "meter")
                    .attr("aria-valuemin", "0")
                    .attr("aria-valuemax", "100")
                    .attr("aria-valuenow", format!("{:.1}", self.consciousness_level))
                    .child(
                        Element::new("div")
                            .class("meter-fill")
                            .style(format!("width: {:.1}%", self.consciousness_level)),
                    ),
            )
            .child(
                Element::new("span")
                    .class("level")
                    .text(format!("Consciousness {:.1}", self.consciousness_level)),
            );

        if !self.physics_domain.is_empty() {
            badge.append(Element::new("span").class("domain").text(self.physics_domain.as_str()));
        }
        if !self.blockchain_hash.is_empty() {
            badge.append(
                Element::new("code")
                    .class("hash")
                    .attr("title", self.blockchain_hash.as_str())
                    .text(short_hash(&self.blockchain_hash)),
            );
        }
        if let Some(state) = ctx.connection {
            badge.append(connection_indicator(state));
        }

        badge.append(
            Element::new("div")
                .class("actions")
                .child(Element::new("button").id("copy").attr("type", "button").text("Copy"))
                .child(
                    Element::new("button")
                        .id("qr")
                        .attr("type", "button")
                        .attr("aria-expanded", self.qr_visible.to_string())
                        .text("QR"),
                ),
        );

        if self.qr_visible {
            badge.append(
                Element::new("div")
                    .id("qr-panel")
                    .class("qr-panel")
                    .attr("data-qr-payload", self.utid.as_str())
                    .child(Element::new("span").class("qr-payload").text(self.utid.as_str())),
            );
        }

        vec![badge.into()]
    }

    fn attach_event_listeners(&self, root: &mut ShadowRoot) {
        if let Some(copy) = root.find_by_id_mut("copy") {
            copy.add_event_listener("click", "copy");
        }
        if let Some(qr) = root.find_by_id_mut("qr") {
            qr.add_event_listener("click", "toggle-qr");
        }
    }
}

impl AttributeReactive for UtidBadge {
    fn schema() -> &'static WidgetSchema {
        &SCHEMA
    }

    fn handle_attribute_change(&mut self, name: &str, value: &AttributeValue) {
        match name {
            "utid" => self.utid = value.to_string(),
            "verified" => self.verified = value.as_bool().unwrap_or(false),
            "blockchain-hash" => self.blockchain_hash = value.to_string(),
            "consciousness-level" => self.consciousness_level = value.as_number().unwrap_or(0.0),
            "physics-domain" => self.physics_domain = value.to_string(),
            _ => {}
        }
    }

    fn should_rerender(&self, name: &str) -> bool {
        name != "ws-url"
    }
}

impl RealtimeConsumer for UtidBadge {
    fn on_websocket_message(&mut self, payload: &serde_json::Value, _emitter: &EventEmitter) -> Update {
        match decode_frame::<BadgeFrame>(SCHEMA.tag, payload) {
            Some(BadgeFrame::UtidUpdate(update)) => Update::from(self.apply_update(update)),
            Some(BadgeFrame::Unknown) | None => Update::None,
        }
    }

    fn renders_connection_state(&self) -> bool {
        true
    }
}

impl Interactive for UtidBadge {
    fn handle_action(&mut self, action: &str, emitter: &EventEmitter) -> Update {
        match action {
            "copy" => {
                if self.utid.is_empty() {
                    tracing::debug!("<{}> nothing to copy", SCHEMA.tag);
                    return Update::None;
                }
                emitter.emit(DomainEvent::UtidCopied(UtidDetail {
                    utid: self.utid.clone(),
                }));
                Update::None
            }
            "toggle-qr" => {
                self.qr_visible = !self.qr_visible;
                if self.qr_visible {
                    emitter.emit(DomainEvent::QrShown(UtidDetail {
                        utid: self.utid.clone(),
                    }));
                }
                Update::Render
            }
            _ => Update::None,
        }
    }
}

impl Widget for UtidBadge {
    const TAG: &'static str = "iv-utid-badge";

    fn create() -> Self {
        Self::default()
    }
}
