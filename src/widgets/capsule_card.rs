// iv-capsule-card: a static summary card for one capsule
//
// Purely attribute-driven. The left border and status badge take the status
// colour straight from the theme, so a theme switch recolours the card on
// the next render.

use crate::dom::{Element, Node, ShadowRoot};
use crate::theme::{Theme, ThemeToken};
use crate::widget::{
    AttributeReactive, AttributeSpec, AttributeValue, CapsuleClickDetail, DomainEvent,
    EventEmitter, Interactive, RealtimeConsumer, RenderContext, Renderable, Update,
    ViewCapsuleDetail, Widget, WidgetSchema,
};

const STATUSES: &[&str] = &["active", "warning", "critical", "resolved"];
const PRIORITIES: &[&str] = &["P1", "P2", "P3", "P4", "P5"];

static SCHEMA: WidgetSchema = WidgetSchema {
    tag: "iv-capsule-card",
    attributes: &[
        AttributeSpec::text("capsule-id", ""),
        AttributeSpec::text("title", "Untitled Capsule"),
        AttributeSpec::choice("status", STATUSES, "active"),
        AttributeSpec::choice("priority", PRIORITIES, "P3"),
        AttributeSpec::text("source", ""),
        AttributeSpec::text("description", ""),
    ],
};

#[derive(Debug, Default)]
pub struct CapsuleCard {
    capsule_id: String,
    title: String,
    status: &'static str,
    priority: &'static str,
    source: String,
    description: String,
}

impl CapsuleCard {
    pub fn status(&self) -> &'static str {
        self.status
    }

    fn status_token(&self) -> ThemeToken {
        match self.status {
            "warning" => ThemeToken::StatusWarning,
            "critical" => ThemeToken::StatusError,
            "resolved" => ThemeToken::StatusInfo,
            _ => ThemeToken::StatusSuccess,
        }
    }

    fn status_label(&self) -> &'static str {
        match self.status {
            "warning" => "Warning",
            "critical" => "Critical",
            "resolved" => "Resolved",
            _ => "Active",
        }
    }
}

impl Renderable for CapsuleCard {
    fn styles(&self, theme: &Theme) -> String {
        let status_color = theme.get(self.status_token());
        format!(
            r#"
.card {{
  font-family: var(--iv-font-sans);
  background: var(--iv-surface-raised);
  color: var(--iv-text-primary);
  border: 1px solid var(--iv-border-subtle);
  border-left: 4px solid {status_color};
  border-radius: var(--iv-radius-md);
  padding: var(--iv-spacing-md);
  cursor: pointer;
  transition: box-shadow var(--iv-duration-fast);
}}
.card:hover {{ box-shadow: var(--iv-shadow-glow); }}
.header {{ display: flex; justify-content: space-between; gap: var(--iv-spacing-sm); }}
.badge {{
  background: {status_color};
  color: var(--iv-surface-base);
  border-radius: var(--iv-radius-full);
  padding: 2px var(--iv-spacing-sm);
  font-size: 12px;
}}
.priority {{ font-family: var(--iv-font-mono); color: var(--iv-text-secondary); }}
.title {{ margin: var(--iv-spacing-sm) 0; font-size: 16px; }}
.description {{ color: var(--iv-text-secondary); margin: 0 0 var(--iv-spacing-sm); }}
.footer {{ display: flex; justify-content: space-between; align-items: center; }}
.source {{ color: var(--iv-text-muted); font-size: 12px; }}
.view {{
  background: var(--iv-brand-primary);
  color: var(--iv-surface-base);
  border: none;
  border-radius: var(--iv-radius-sm);
  padding: var(--iv-spacing-xs) var(--iv-spacing-sm);
  cursor: pointer;
}}
"#
        )
    }

    fn render(&self, _ctx: &RenderContext) -> Vec<Node> {
        let header = Element::new("header")
            .class("header")
            .child(
                Element::new("span")
                    .class(format!("priority priority-{}", self.priority.to_lowercase()))
                    .text(self.priority),
            )
            .child(
                Element::new("span")
                    .id("status-badge")
                    .class(format!("badge badge-{}", self.status))
                    .text(self.status_label()),
            );

        let mut card = Element::new("article")
            .id("card")
            .class(format!("card status-{}", self.status))
            .attr("part", "card")
            .attr("data-capsule-id", self.capsule_id.as_str())
            .child(header)
            .child(Element::new("h3").class("title").text(self.title.as_str()));

        if !self.description.is_empty() {
            card.append(
                Element::new("p")
                    .class("description")
                    .text(self.description.as_str()),
            );
        }

        let source = if self.source.is_empty() {
            "Unknown source"
        } else {
            self.source.as_str()
        };
        card.append(
            Element::new("footer")
                .class("footer")
                .child(Element::new("span").class("source").text(source))
                .child(
                    Element::new("button")
                        .id("view")
                        .class("view")
                        .attr("type", "button")
                        .text("View"),
                ),
        );

        vec![card.into()]
    }

    fn attach_event_listeners(&self, root: &mut ShadowRoot) {
        if let Some(card) = root.find_by_id_mut("card") {
            card.add_event_listener("click", "capsule-click");
        }
        if let Some(view) = root.find_by_id_mut("view") {
            view.add_event_listener("click", "view-capsule");
        }
    }
}

impl AttributeReactive for CapsuleCard {
    fn schema() -> &'static WidgetSchema {
        &SCHEMA
    }

    fn handle_attribute_change(&mut self, name: &str, value: &AttributeValue) {
        match name {
            "capsule-id" => self.capsule_id = value.to_string(),
            "title" => self.title = value.to_string(),
            "status" => self.status = value.as_choice().unwrap_or("active"),
            "priority" => self.priority = value.as_choice().unwrap_or("P3"),
            "source" => self.source = value.to_string(),
            "description" => self.description = value.to_string(),
            _ => {}
        }
    }
}

impl RealtimeConsumer for CapsuleCard {}

impl Interactive for CapsuleCard {
    fn handle_action(&mut self, action: &str, emitter: &EventEmitter) -> Update {
        match action {
            "capsule-click" => {
                emitter.emit(DomainEvent::CapsuleClick(CapsuleClickDetail {
                    capsule_id: self.capsule_id.clone(),
                }));
            }
            "view-capsule" => {
                emitter.emit(DomainEvent::ViewCapsule(ViewCapsuleDetail {
                    capsule_id: self.capsule_id.clone(),
                    title: self.title.clone(),
                    status: self.status.to_string(),
                }));
            }
            _ => {}
        }
        Update::None
    }
}

impl Widget for CapsuleCard {
    const TAG: &'static str = "iv-capsule-card";

    fn create() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{ElementId, WidgetHost, CustomElement};
    use crate::testing::host_context;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn card(attrs: &[(&str, &str)]) -> WidgetHost<CapsuleCard> {
        let (ctx, _rx) = host_context();
        let mut host = WidgetHost::<CapsuleCard>::new(ElementId::next(), ctx);
        for (name, value) in attrs {
            host.attribute_changed_callback(name, Some(value));
        }
        host.connected_callback();
        host
    }

    #[test]
    fn test_critical_status_uses_theme_error_color() {
        let host = card(&[("status", "critical"), ("title", "Reactor")]);
        let root = host.shadow_root();

        let badge = root.find_by_id("status-badge").unwrap();
        assert_eq!(badge.text_content(), "Critical");

        let error_color = Theme::fallback().get(ThemeToken::StatusError).to_string();
        let style = root.elements().find(|e| e.tag() == "style").unwrap().text_content();
        assert!(style.contains(&format!("border-left: 4px solid {};", error_color)));
    }

    #[test]
    fn test_defaults() {
        let host = card(&[]);
        assert_eq!(host.widget().status(), "active");
        let root = host.shadow_root();
        assert_eq!(root.find_by_class("title").unwrap().text_content(), "Untitled Capsule");
        assert_eq!(root.find_by_class("priority").unwrap().text_content(), "P3");
        assert!(root.find_by_class("description").is_none());
    }

    #[test]
    fn test_invalid_choice_falls_back() {
        let host = card(&[("status", "exploded"), ("priority", "p1")]);
        assert_eq!(host.widget().status(), "active");
        let root = host.shadow_root();
        assert_eq!(root.find_by_class("priority").unwrap().text_content(), "P1");
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut host = card(&[("capsule-id", "cap-9"), ("description", "<b>bold</b>")]);
        let first = host.outer_html();
        host.render();
        assert_eq!(first, host.outer_html());
        assert!(first.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn test_click_events() {
        let (ctx, _rx) = host_context();
        let mut events = ctx.document.subscribe();
        let mut host = WidgetHost::<CapsuleCard>::new(ElementId::next(), ctx);
        host.attribute_changed_callback("capsule-id", Some("cap-1"));
        host.attribute_changed_callback("title", Some("Ledger"));
        host.connected_callback();

        assert!(host.dispatch_event("view", "click"));
        let event = events.try_recv().unwrap();
        assert_eq!(event.event_type, "view-capsule");
        assert_eq!(
            event.detail,
            json!({"capsuleId": "cap-1", "title": "Ledger", "status": "active"})
        );

        assert!(host.dispatch_event("card", "click"));
        let event = events.try_recv().unwrap();
        assert_eq!(event.event_type, "capsule-click");
        assert_eq!(event.detail, json!({"capsuleId": "cap-1"}));
    }
}
