//! Adapter for the `pii` analyzer.
//!
//! Expected schema: `{ "entities": [{start,end,label?,replacement?}],
//! "severity"?: 0..4, "reasons"?: [string] }`. Flagged whenever
//! `entities` is non-empty; there is no separate boolean flag field.

use super::{reasons_field, severity_field, spans_field};
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    if raw.get("entities").map(Value::is_array) != Some(true) {
        return Verdict::error("pii", "malformed response: missing array 'entities'");
    }
    let spans = spans_field(raw, "entities");
    let flagged = !spans.is_empty();
    let severity = severity_field(raw, "severity", 2);
    let mut reasons = reasons_field(raw, "reasons");
    if reasons.is_empty() && flagged {
        let labels: Vec<String> = spans.iter().map(|s| s.label.clone()).collect();
        reasons.push(format!("pii_detected:{}", labels.join(",")));
    }

    Verdict {
        name: "pii".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity: if flagged { severity } else { 0 },
        reasons,
        spans,
        raw: raw.clone(),
    }
}
