//! The `iv-*` widget family
//!
//! | Tag               | Widget          | Realtime frames     |
//! |-------------------|-----------------|---------------------|
//! | `iv-capsule-card` | [`CapsuleCard`] | -                   |
//! | `iv-proof-ticker` | [`ProofTicker`] | `proof_generated`   |
//! | `iv-utid-badge`   | [`UtidBadge`]   | `utid_update`       |
//! | `iv-wallet-orb`   | [`WalletOrb`]   | `balance_update`    |

mod capsule_card;
mod proof_ticker;
mod sparkline;
mod utid_badge;
mod wallet_orb;

pub use capsule_card::CapsuleCard;
pub use proof_ticker::ProofTicker;
pub use sparkline::sparkline;
pub use utid_badge::UtidBadge;
pub use wallet_orb::WalletOrb;

use crate::dom::{Element, Node};
use crate::error::DecodeError;
use crate::realtime::ConnectionState;
use crate::widget;
use serde::de::DeserializeOwned;

/// Register every built-in widget. Safe to call repeatedly.
pub fn define_all() {
    widget::define::<CapsuleCard>();
    widget::define::<ProofTicker>();
    widget::define::<UtidBadge>();
    widget::define::<WalletOrb>();
}

/// Decode a payload into a widget's frame enum.
///
/// A payload whose `type` is known but whose fields don't fit is logged and
/// dropped; unknown types are left to the enum's catch-all variant.
pub(crate) fn decode_frame<F: DeserializeOwned>(tag: &str, payload: &serde_json::Value) -> Option<F> {
    match F::deserialize(payload) {
        Ok(frame) => Some(frame),
        Err(e) => {
            let error = DecodeError::Schema {
                kind: payload
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<untyped>")
                    .to_string(),
                reason: e.to_string(),
            };
            tracing::warn!("<{}> dropping frame: {}", tag, error);
            None
        }
    }
}

/// Small dot + label for the channel state
pub(crate) fn connection_indicator(state: ConnectionState) -> Node {
    Element::new("span")
        .id("connection")
        .class(format!("connection connection-{}", state.as_str()))
        .attr("title", state.as_str())
        .text(state.as_str())
        .into()
}

/// CSS shared by every widget's connection indicator
pub(crate) fn connection_css() -> &'static str {
    ".connection { font-size: 11px; color: var(--iv-text-muted); }\n\
     .connection::before { content: ''; display: inline-block; width: 6px; height: 6px; \
     margin-right: 4px; border-radius: var(--iv-radius-full); background: var(--iv-text-muted); }\n\
     .connection-connected::before { background: var(--iv-status-success); }\n\
     .connection-connecting::before { background: var(--iv-status-warning); }\n\
     .connection-error::before { background: var(--iv-status-error); }\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum Sample {
        Ping { n: u32 },
        #[serde(other)]
        Unknown,
    }

    #[test]
    fn test_decode_frame() {
        assert_eq!(
            decode_frame::<Sample>("iv-test", &json!({"type": "ping", "n": 2})),
            Some(Sample::Ping { n: 2 })
        );
        assert_eq!(
            decode_frame::<Sample>("iv-test", &json!({"type": "other", "x": 1})),
            Some(Sample::Unknown)
        );
        assert_eq!(decode_frame::<Sample>("iv-test", &json!({"type": "ping", "n": "two"})), None);
        assert_eq!(decode_frame::<Sample>("iv-test", &json!([1, 2])), None);
    }

    #[test]
    fn test_define_all_registers_every_tag() {
        define_all();
        define_all();
        for tag in ["iv-capsule-card", "iv-proof-ticker", "iv-utid-badge", "iv-wallet-orb"] {
            assert!(widget::lookup(tag).is_some(), "{} not defined", tag);
        }
    }
}
