// iv-wallet-orb: glowing balance orb with a short balance history
//
// `balance_update` frames set the balance; the last HISTORY_LEN balances
// feed the sparkline under the orb.

use super::{connection_css, connection_indicator, decode_frame, sparkline};
use crate::dom::{Element, Node, ShadowRoot};
use crate::theme::{Theme, ThemeToken};
use crate::widget::{
    AttributeReactive, AttributeSpec, AttributeValue, BoundedBuffer, DomainEvent, EventEmitter,
    Interactive, OrbClickDetail, RealtimeConsumer, RenderContext, Renderable, Update, Widget,
    WidgetSchema,
};
use serde::Deserialize;

const HISTORY_LEN: usize = 30;
const DEFAULT_CURRENCY: &str = "IVC";

static SCHEMA: WidgetSchema = WidgetSchema {
    tag: "iv-wallet-orb",
    attributes: &[
        AttributeSpec::text("ws-url", ""),
        AttributeSpec::boolean("show-balance", false),
        AttributeSpec::number("glow-intensity", 0.5, Some(0.0), Some(1.0)),
        AttributeSpec::text("currency", DEFAULT_CURRENCY),
    ],
};

#[derive(Debug, Deserialize)]
struct BalanceUpdate {
    balance: f64,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OrbFrame {
    BalanceUpdate(BalanceUpdate),
    #[serde(other)]
    Unknown,
}

#[derive(Debug)]
pub struct WalletOrb {
    show_balance: bool,
    glow_intensity: f64,
    /// From the attribute
    currency: String,
    /// Last currency reported by the feed, overrides the attribute
    feed_currency: Option<String>,
    balance: Option<f64>,
    /// Newest first
    history: BoundedBuffer<f64>,
}

impl WalletOrb {
    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn currency(&self) -> &str {
        self.feed_currency.as_deref().unwrap_or(&self.currency)
    }

    fn history_oldest_first(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.history.iter().copied().collect();
        values.reverse();
        values
    }
}

impl Renderable for WalletOrb {
    fn styles(&self, theme: &Theme) -> String {
        let glow_px = (self.glow_intensity * 40.0).round();
        format!(
            r#"
.orb-container {{
  display: inline-flex;
  flex-direction: column;
  align-items: center;
  gap: var(--iv-spacing-sm);
  font-family: var(--iv-font-sans);
  color: var(--iv-text-primary);
}}
.orb {{
  width: 96px;
  height: 96px;
  border: none;
  border-radius: var(--iv-radius-full);
  background: radial-gradient(circle at 30% 30%, var(--iv-brand-accent), var(--iv-brand-primary) 60%, var(--iv-brand-secondary));
  box-shadow: 0 0 {glow_px}px {glow_color};
  opacity: {opacity:.2};
  cursor: pointer;
  transition: box-shadow var(--iv-duration-slow);
}}
.orb:hover {{ box-shadow: 0 0 {hover_px}px {glow_color}; }}
.balance {{ font-family: var(--iv-font-mono); font-size: 18px; }}
.balance.empty {{ color: var(--iv-text-muted); }}
.currency {{ color: var(--iv-text-secondary); margin-left: var(--iv-spacing-xs); }}
.sparkline-empty {{ font-size: 11px; color: var(--iv-text-muted); }}
{connection}"#,
            glow_px = glow_px,
            hover_px = glow_px + 8.0,
            glow_color = theme.get(ThemeToken::BrandPrimary),
            opacity = 0.6 + 0.4 * self.glow_intensity,
            connection = connection_css(),
        )
    }

    fn render(&self, ctx: &RenderContext) -> Vec<Node> {
        let label = match self.balance {
            Some(balance) => format!("Wallet balance {:.2} {}", balance, self.currency()),
            None => "Wallet".to_string(),
        };
        let mut container = Element::new("div").class("orb-container").child(
            Element::new("button")
                .id("orb")
                .class("orb")
                .attr("type", "button")
                .attr("aria-label", label)
                .attr("data-glow", format!("{:.2}", self.glow_intensity)),
        );

        if self.show_balance {
            let balance = match self.balance {
                Some(balance) => Element::new("div")
                    .id("balance")
                    .class("balance")
                    .text(format!("{:.2}", balance))
                    .child(Element::new("span").class("currency").text(self.currency())),
                None => Element::new("div")
                    .id("balance")
                    .class("balance empty")
                    .text("—"),
            };
            container.append(balance);
            container.append(sparkline(
                &self.history_oldest_first(),
                ctx.theme.get(ThemeToken::BrandAccent),
            ));
        }

        if let Some(state) = ctx.connection {
            container.append(connection_indicator(state));
        }

        vec![container.into()]
    }

    fn attach_event_listeners(&self, root: &mut ShadowRoot) {
        if let Some(orb) = root.find_by_id_mut("orb") {
            orb.add_event_listener("click", "orb-click");
        }
    }
}

impl AttributeReactive for WalletOrb {
    fn schema() -> &'static WidgetSchema {
        &SCHEMA
    }

    fn handle_attribute_change(&mut self, name: &str, value: &AttributeValue) {
        match name {
            "show-balance" => self.show_balance = value.as_bool().unwrap_or(false),
            "glow-intensity" => self.glow_intensity = value.as_number().unwrap_or(0.5),
            "currency" => {
                self.currency = value.to_string();
                self.feed_currency = None;
            }
            _ => {}
        }
    }

    fn should_rerender(&self, name: &str) -> bool {
        name != "ws-url"
    }
}

impl RealtimeConsumer for WalletOrb {
    fn on_websocket_message(&mut self, payload: &serde_json::Value, _emitter: &EventEmitter) -> Update {
        let Some(OrbFrame::BalanceUpdate(update)) = decode_frame::<OrbFrame>(SCHEMA.tag, payload)
        else {
            return Update::None;
        };
        if !update.balance.is_finite() {
            tracing::warn!("<{}> ignoring non-finite balance", SCHEMA.tag);
            return Update::None;
        }

        self.balance = Some(update.balance);
        self.history.push_front(update.balance);
        if let Some(currency) = update.currency.filter(|c| !c.is_empty()) {
            self.feed_currency = Some(currency);
        }
        Update::Render
    }

    fn renders_connection_state(&self) -> bool {
        true
    }
}

impl Interactive for WalletOrb {
    fn handle_action(&mut self, action: &str, emitter: &EventEmitter) -> Update {
        if action == "orb-click" {
            emitter.emit(DomainEvent::OrbClick(OrbClickDetail {
                balance: self.balance.unwrap_or(0.0),
                currency: self.currency().to_string(),
            }));
        }
        Update::None
    }
}

impl Widget for WalletOrb {
    const TAG: &'static str = "iv-wallet-orb";

    fn create() -> Self {
        Self {
            show_balance: false,
            glow_intensity: 0.5,
            currency: DEFAULT_CURRENCY.to_string(),
            feed_currency: None,
            balance: None,
            history: BoundedBuffer::new(HISTORY_LEN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, EventTarget};
    use crate::testing::host_context;
    use crate::widget::{CustomElement, ElementId, WidgetHost};
    use serde_json::json;

    fn emitter() -> EventEmitter {
        EventEmitter::new(
            Document::new(),
            EventTarget {
                tag: WalletOrb::TAG,
                element: ElementId(1),
            },
        )
    }

    fn orb(attrs: &[(&str, &str)]) -> WidgetHost<WalletOrb> {
        let (ctx, _rx) = host_context();
        let mut host = WidgetHost::<WalletOrb>::new(ElementId::next(), ctx);
        for (name, value) in attrs {
            host.attribute_changed_callback(name, Some(value));
        }
        host.connected_callback();
        host
    }

    #[test]
    fn test_balance_hidden_by_default() {
        let host = orb(&[]);
        assert!(host.shadow_root().find_by_id("balance").is_none());
        assert!(host.shadow_root().find_by_id("orb").is_some());
    }

    #[test]
    fn test_balance_placeholders_before_first_update() {
        let host = orb(&[("show-balance", "")]);
        let root = host.shadow_root();
        assert!(root.find_by_id("balance").unwrap().has_class("empty"));
        assert!(root.find_by_class("sparkline-empty").is_some());
    }

    #[test]
    fn test_balance_updates_feed_history() {
        let emitter = emitter();
        let mut widget = WalletOrb::create();
        widget.show_balance = true;

        for balance in [10.0, 12.5, 11.0] {
            let frame = json!({"type": "balance_update", "balance": balance});
            assert_eq!(widget.on_websocket_message(&frame, &emitter), Update::Render);
        }
        assert_eq!(widget.balance(), Some(11.0));
        assert_eq!(widget.history_oldest_first(), [10.0, 12.5, 11.0]);

        let with_currency = json!({"type": "balance_update", "balance": 1, "currency": "ETH"});
        widget.on_websocket_message(&with_currency, &emitter);
        assert_eq!(widget.currency(), "ETH");

        let bad = json!({"type": "balance_update", "balance": "lots"});
        assert_eq!(widget.on_websocket_message(&bad, &emitter), Update::None);
        assert_eq!(widget.balance(), Some(1.0));
    }

    #[test]
    fn test_history_is_bounded() {
        let emitter = emitter();
        let mut widget = WalletOrb::create();
        for i in 0..(HISTORY_LEN + 5) {
            widget.on_websocket_message(&json!({"type": "balance_update", "balance": i}), &emitter);
        }
        assert_eq!(widget.history.len(), HISTORY_LEN);
        assert_eq!(widget.history.front(), Some(&((HISTORY_LEN + 4) as f64)));
    }

    #[test]
    fn test_orb_click_event() {
        let (ctx, _rx) = host_context();
        let mut events = ctx.document.subscribe();
        let mut host = WidgetHost::<WalletOrb>::new(ElementId::next(), ctx);
        host.connected_callback();

        assert!(host.dispatch_event("orb", "click"));
        let event = events.try_recv().unwrap();
        assert_eq!(event.event_type, "orb-click");
        assert_eq!(event.detail, json!({"balance": 0.0, "currency": "IVC"}));
    }

    #[test]
    fn test_glow_intensity_clamped() {
        let host = orb(&[("glow-intensity", "3")]);
        let orb = host.shadow_root().find_by_id("orb").unwrap();
        assert_eq!(orb.get_attribute("data-glow"), Some("1.00"));
    }
}
