//! Adapter for the `brand` (competitor/banned-term) analyzer.
//!
//! Expected schema: `{ "violated": bool, "severity"?: 0..4, "reasons"?:
//! [string], "spans"?: [{start,end,label?,replacement?}] }` — same
//! shape as `policy`, but a distinct upstream service in practice.

use super::{bool_field, reasons_field, severity_field, spans_field, verdict_from_flag};
use mg_domain::types::Verdict;
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(violated) = bool_field(raw, "violated") else {
        return Verdict::error("brand", "malformed response: missing boolean 'violated'");
    };
    let severity = severity_field(raw, "severity", 2);
    let reasons = reasons_field(raw, "reasons");
    let spans = spans_field(raw, "spans");
    verdict_from_flag("brand", violated, severity, reasons, spans, raw.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_domain::types::Outcome;
    use serde_json::json;

    #[test]
    fn violation_with_span() {
        let raw = json!({
            "violated": true,
            "severity": 2,
            "spans": [{"start": 0, "end": 9, "label": "competitor_mention"}]
        });
        let v = adapt(&raw);
        assert_eq!(v.outcome, Outcome::Flagged);
        assert_eq!(v.spans.len(), 1);
    }
}
