// iv-proof-ticker: live list of the most recent proofs
//
// Proofs arrive as `proof_generated` frames, newest first, capped at
// `max-items`. Lowering `max-items` drops the oldest entries immediately.

use super::{connection_css, connection_indicator, decode_frame};
use crate::dom::{Element, Node};
use crate::theme::{Theme, ThemeToken};
use crate::widget::{
    AttributeReactive, AttributeSpec, AttributeValue, BoundedBuffer, DomainEvent, EventEmitter,
    Interactive, Proof, RealtimeConsumer, RenderContext, Renderable, Update, Widget, WidgetSchema,
};
use chrono::Utc;
use serde::Deserialize;

const DEFAULT_MAX_ITEMS: i64 = 10;

static SCHEMA: WidgetSchema = WidgetSchema {
    tag: "iv-proof-ticker",
    attributes: &[
        AttributeSpec::text("ws-url", ""),
        AttributeSpec::integer("max-items", DEFAULT_MAX_ITEMS, 1, 100),
        AttributeSpec::choice("scroll-speed", &["slow", "normal", "fast"], "normal"),
    ],
};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TickerFrame {
    ProofGenerated(Proof),
    #[serde(other)]
    Unknown,
}

#[derive(Debug)]
pub struct ProofTicker {
    proofs: BoundedBuffer<Proof>,
    scroll_speed: &'static str,
    received: u64,
}

impl ProofTicker {
    /// Proofs currently shown, newest first
    pub fn proofs(&self) -> impl Iterator<Item = &Proof> {
        self.proofs.iter()
    }

    /// Total proofs received since mount (including evicted ones)
    pub fn received(&self) -> u64 {
        self.received
    }

    fn speed_token(&self) -> ThemeToken {
        match self.scroll_speed {
            "slow" => ThemeToken::DurationSlow,
            "fast" => ThemeToken::DurationFast,
            _ => ThemeToken::DurationNormal,
        }
    }

    fn proof_row(proof: &Proof) -> Element {
        let source = if proof.source.is_empty() {
            "unknown"
        } else {
            proof.source.as_str()
        };
        Element::new("li")
            .class("proof")
            .attr("data-proof-id", proof.id.as_str())
            .child(Element::new("span").class("proof-type").text(proof.proof_type.as_str()))
            .child(Element::new("span").class("proof-value").text(format!("{:.2}", proof.value)))
            .child(Element::new("span").class("proof-source").text(source))
            .child(
                Element::new("time")
                    .class("proof-time")
                    .attr("datetime", proof.received_at.to_rfc3339())
                    .text(proof.received_at.format("%H:%M:%S").to_string()),
            )
    }
}

impl Renderable for ProofTicker {
    fn styles(&self, theme: &Theme) -> String {
        format!(
            r#"
.ticker {{
  font-family: var(--iv-font-sans);
  background: var(--iv-surface-base);
  color: var(--iv-text-primary);
  border: 1px solid var(--iv-border-subtle);
  border-radius: var(--iv-radius-md);
  padding: var(--iv-spacing-sm);
}}
.ticker-header {{ display: flex; justify-content: space-between; margin-bottom: var(--iv-spacing-sm); }}
.ticker-title {{ font-weight: 600; color: var(--iv-brand-primary); }}
.proof-list {{ list-style: none; margin: 0; padding: 0; }}
.proof {{
  display: grid;
  grid-template-columns: 1fr auto auto auto;
  gap: var(--iv-spacing-sm);
  padding: var(--iv-spacing-xs) 0;
  border-bottom: 1px solid var(--iv-border-subtle);
  animation: slide-in {duration} ease-out;
}}
.proof:first-child {{ color: var(--iv-brand-accent); }}
.proof-value, .proof-time {{ font-family: var(--iv-font-mono); }}
.proof-source, .proof-time {{ color: var(--iv-text-muted); }}
.placeholder {{ color: var(--iv-text-muted); text-align: center; margin: var(--iv-spacing-md) 0; }}
@keyframes slide-in {{ from {{ opacity: 0; transform: translateY(-4px); }} to {{ opacity: 1; }} }}
{connection}"#,
            duration = theme.get(self.speed_token()),
            connection = connection_css(),
        )
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Node> {
        let mut header = Element::new("header")
            .class("ticker-header")
            .child(Element::new("span").class("ticker-title").text("Live Proofs"));
        if let Some(state) = ctx.connection {
            header.append(connection_indicator(state));
        }

        let body: Node = if self.proofs.is_empty() {
            Element::new("p")
                .id("placeholder")
                .class("placeholder")
                .text("Waiting for proofs…")
                .into()
        } else {
            Element::new("ol")
                .id("proofs")
                .class("proof-list")
                .children(self.proofs.iter().map(Self::proof_row))
                .into()
        };

        vec![Element::new("section")
            .class(format!("ticker speed-{}", self.scroll_speed))
            .attr("aria-live", "polite")
            .child(header)
            .child(body)
            .into()]
    }
}

impl AttributeReactive for ProofTicker {
    fn schema() -> &'static WidgetSchema {
        &SCHEMA
    }

    fn handle_attribute_change(&mut self, name: &str, value: &AttributeValue) {
        match name {
            "max-items" => {
                let max = value.as_integer().unwrap_or(DEFAULT_MAX_ITEMS).max(1) as usize;
                let evicted = self.proofs.set_capacity(max);
                if evicted > 0 {
                    tracing::debug!("<{}> trimmed {} proof(s) to fit {}", SCHEMA.tag, evicted, max);
                }
            }
            "scroll-speed" => self.scroll_speed = value.as_choice().unwrap_or("normal"),
            _ => {}
        }
    }

    fn should_rerender(&self, name: &str) -> bool {
        // The channel swap already triggers a render for ws-url
        name != "ws-url"
    }
}

impl RealtimeConsumer for ProofTicker {
    fn on_websocket_message(&mut self, payload: &serde_json::Value, emitter: &EventEmitter) -> Update {
        match decode_frame::<TickerFrame>(SCHEMA.tag, payload) {
            Some(TickerFrame::ProofGenerated(mut proof)) => {
                proof.received_at = Utc::now();
                self.received += 1;
                self.proofs.push_front(proof.clone());
                emitter.emit(DomainEvent::ProofAdded(proof));
                Update::Render
            }
            Some(TickerFrame::Unknown) | None => Update::None,
        }
    }

    fn renders_connection_state(&self) -> bool {
        true
    }
}

impl Interactive for ProofTicker {}

impl Widget for ProofTicker {
    const TAG: &'static str = "iv-proof-ticker";

    fn create() -> Self {
        Self {
            proofs: BoundedBuffer::new(DEFAULT_MAX_ITEMS as usize),
            scroll_speed: "normal",
            received: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::document::EventTarget;
    use crate::widget::ElementId;
    use serde_json::json;

    fn emitter() -> (EventEmitter, tokio::sync::mpsc::UnboundedReceiver<crate::document::CustomEvent>) {
        let document = Document::new();
        let rx = document.subscribe();
        let emitter = EventEmitter::new(
            document,
            EventTarget {
                tag: "iv-proof-ticker",
                element: ElementId(1),
            },
        );
        (emitter, rx)
    }

    fn frame(id: &str) -> serde_json::Value {
        json!({"type": "proof_generated", "id": id, "proofType": "execution", "value": 1.5, "source": "demo"})
    }

    fn ids(ticker: &ProofTicker) -> Vec<String> {
        ticker.proofs().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_max_items_three() {
        let (emitter, _rx) = emitter();
        let mut ticker = ProofTicker::create();
        ticker.handle_attribute_change("max-items", &AttributeValue::Integer(3));

        for id in ["a", "b", "c"] {
            assert_eq!(ticker.on_websocket_message(&frame(id), &emitter), Update::Render);
        }
        assert_eq!(ids(&ticker), ["c", "b", "a"]);

        ticker.on_websocket_message(&frame("d"), &emitter);
        assert_eq!(ids(&ticker), ["d", "c", "b"]);
        assert_eq!(ticker.received(), 4);
    }

    #[test]
    fn test_lowering_max_items_trims_now() {
        let (emitter, _rx) = emitter();
        let mut ticker = ProofTicker::create();
        for id in ["a", "b", "c", "d", "e"] {
            ticker.on_websocket_message(&frame(id), &emitter);
        }
        ticker.handle_attribute_change("max-items", &AttributeValue::Integer(2));
        assert_eq!(ids(&ticker), ["e", "d"]);
    }

    #[test]
    fn test_proof_added_event() {
        let (emitter, mut rx) = emitter();
        let mut ticker = ProofTicker::create();
        ticker.on_websocket_message(&frame("proof_1"), &emitter);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, "proof-added");
        assert_eq!(event.detail["id"], "proof_1");
        assert_eq!(event.detail["proofType"], "execution");
        assert!(event.detail["receivedAt"].is_string());
    }

    #[test]
    fn test_unknown_and_mismatched_frames_are_ignored() {
        let (emitter, mut rx) = emitter();
        let mut ticker = ProofTicker::create();

        let unknown = json!({"type": "balance_update", "balance": 3});
        assert_eq!(ticker.on_websocket_message(&unknown, &emitter), Update::None);

        let mismatched = json!({"type": "proof_generated", "id": 7});
        assert_eq!(ticker.on_websocket_message(&mismatched, &emitter), Update::None);

        assert!(ticker.proofs.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_placeholder_when_empty() {
        let ticker = ProofTicker::create();
        let theme = Theme::fallback();
        let nodes = ticker.render(&RenderContext {
            theme: &theme,
            element: ElementId(1),
            connection: None,
        });
        let section = nodes[0].as_element().unwrap();
        assert!(section.find_by_id("placeholder").is_some());
        assert!(section.find_by_id("connection").is_none());
    }
}
