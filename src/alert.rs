//! Incoming webhook payload — a flat market snapshot.
//!
//! Charting platforms assemble the alert body from user-editable templates,
//! so the payload is deliberately schemaless: [`TradeAlert`] is a transparent
//! JSON object that tolerates missing, extra, and oddly-typed fields. The
//! well-known fields render first in [`snapshot`](TradeAlert::snapshot), in a
//! fixed order the prompt templates rely on; anything else follows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Snapshot fields the decision prompt expects, in render order.
pub const SNAPSHOT_FIELDS: &[&str] = &[
    "symbol",
    "timeframe",
    "price",
    "candle_high",
    "candle_low",
    "rsi",
    "signal_type",
    "key_level_resistance",
    "mid_support",
    "downside_target",
    "upside_target",
];

/// Placeholder rendered for a well-known field the alert did not carry.
const MISSING: &str = "n/a";

/// One trade-signal webhook body, kept verbatim for echoing back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeAlert(pub Map<String, Value>);

impl TradeAlert {
    /// Render the `Market snapshot:` block substituted into the decision prompt.
    ///
    /// Known fields come first in [`SNAPSHOT_FIELDS`] order (`n/a` when absent),
    /// then any extra fields the alert carried.
    pub fn snapshot(&self) -> String {
        let mut lines = vec!["Market snapshot:".to_string()];

        for field in SNAPSHOT_FIELDS {
            let value = self.0.get(*field).map(render).unwrap_or_else(|| MISSING.into());
            lines.push(format!("{field}: {value}"));
        }
        for (key, value) in &self.0 {
            if !SNAPSHOT_FIELDS.contains(&key.as_str()) {
                lines.push(format!("{key}: {}", render(value)));
            }
        }

        lines.join("\n")
    }

    /// Symbol field for log context, when present as a string.
    pub fn symbol(&self) -> Option<&str> {
        self.0.get("symbol").and_then(Value::as_str)
    }
}

/// Scalar values render bare (no JSON quoting); everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
