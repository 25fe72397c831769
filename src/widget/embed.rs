//! Embed code generation
//!
//! Turns a configuration object (camelCase keys, JSON values) into the HTML
//! a host page pastes in. Attributes come out in schema order so the same
//! configuration always yields the same snippet.
//!
//! | JSON value        | Output              |
//! |-------------------|---------------------|
//! | `true`            | bare attribute      |
//! | `false` / `null`  | omitted             |
//! | `""`              | omitted             |
//! | number            | shortest decimal    |
//! | string            | escaped verbatim    |
//! | array / object    | compact JSON, escaped |
//!
//! Keys the schema doesn't know are dropped.

use super::attributes::WidgetSchema;
use super::registry;
use crate::dom::escape_attribute;
use crate::error::WidgetError;
use serde_json::{Map, Value};

/// `glow-intensity` -> `glowIntensity`
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn attribute_value(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(None),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(n) => Some(Some(n.to_string())),
        other => Some(Some(other.to_string())),
    }
}

/// Build `<tag a="..." b>` `</tag>` for a configuration object
pub fn embed_code(schema: &WidgetSchema, config: &Map<String, Value>) -> String {
    let mut html = format!("<{}", schema.tag);
    for name in schema.observed_attributes() {
        let Some(value) = config.get(&kebab_to_camel(name)) else {
            continue;
        };
        match attribute_value(value) {
            None => {}
            Some(None) => {
                html.push(' ');
                html.push_str(name);
            }
            Some(Some(text)) => {
                html.push_str(&format!(" {}=\"{}\"", name, escape_attribute(&text)));
            }
        }
    }

    let known: Vec<String> = schema.observed_attributes().map(kebab_to_camel).collect();
    for key in config.keys().filter(|k| !known.contains(k)) {
        tracing::debug!("<{}> embed: ignoring unknown option '{}'", schema.tag, key);
    }

    html.push_str(&format!("></{}>", schema.tag));
    html
}

/// Embed code for a registered tag
pub fn embed_code_for_tag(tag: &str, config: &Map<String, Value>) -> Result<String, WidgetError> {
    let definition =
        registry::lookup(tag).ok_or_else(|| WidgetError::UnknownElement(tag.to_string()))?;
    Ok(embed_code(definition.schema, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::attributes::AttributeSpec;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    static ORB_SCHEMA: WidgetSchema = WidgetSchema {
        tag: "iv-wallet-orb",
        attributes: &[
            AttributeSpec::text("ws-url", ""),
            AttributeSpec::boolean("show-balance", false),
            AttributeSpec::number("glow-intensity", 0.5, Some(0.0), Some(1.0)),
            AttributeSpec::text("currency", "IVC"),
        ],
    };

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_wallet_orb_snippet() {
        let html = embed_code(
            &ORB_SCHEMA,
            &config(json!({
                "wsUrl": "wss://x",
                "showBalance": true,
                "glowIntensity": 0.8,
            })),
        );
        assert_eq!(
            html,
            r#"<iv-wallet-orb ws-url="wss://x" show-balance glow-intensity="0.8"></iv-wallet-orb>"#
        );
    }

    #[test]
    fn test_registered_wallet_orb_snippet() {
        crate::widgets::define_all();
        let html = embed_code_for_tag(
            "iv-wallet-orb",
            &config(json!({
                "wsUrl": "wss://x",
                "showBalance": true,
                "glowIntensity": 0.8,
            })),
        )
        .unwrap();
        assert_eq!(
            html,
            r#"<iv-wallet-orb ws-url="wss://x" show-balance glow-intensity="0.8"></iv-wallet-orb>"#
        );
    }

    #[test]
    fn test_schema_order_not_input_order() {
        let html = embed_code(
            &ORB_SCHEMA,
            &config(json!({"currency": "USD", "wsUrl": "ws://a"})),
        );
        assert_eq!(html, r#"<iv-wallet-orb ws-url="ws://a" currency="USD"></iv-wallet-orb>"#);
    }

    #[test]
    fn test_omitted_values_and_unknown_keys() {
        let html = embed_code(
            &ORB_SCHEMA,
            &config(json!({
                "showBalance": false,
                "wsUrl": "",
                "currency": null,
                "colour": "red",
            })),
        );
        assert_eq!(html, "<iv-wallet-orb></iv-wallet-orb>");
    }

    #[test]
    fn test_values_are_escaped() {
        let html = embed_code(&ORB_SCHEMA, &config(json!({"currency": "\"><script>"})));
        assert_eq!(
            html,
            r#"<iv-wallet-orb currency="&quot;&gt;&lt;script&gt;"></iv-wallet-orb>"#
        );
    }

    #[test]
    fn test_kebab_to_camel() {
        assert_eq!(kebab_to_camel("ws-url"), "wsUrl");
        assert_eq!(kebab_to_camel("max-items"), "maxItems");
        assert_eq!(kebab_to_camel("status"), "status");
    }
}
