//! Adapter for the `policy` analyzer.
//!
//! Expected schema: `{ "violated": bool, "severity"?: 0..4, "reasons"?:
//! [string], "spans"?: [{start,end,label?,replacement?}] }`.

use super::{bool_field, reasons_field, severity_field, spans_field, verdict_from_flag};
use mg_domain::types::Verdict;
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(violated) = bool_field(raw, "violated") else {
        return Verdict::error("policy", "malformed response: missing boolean 'violated'");
    };
    let severity = severity_field(raw, "severity", 4);
    let reasons = reasons_field(raw, "reasons");
    let spans = spans_field(raw, "spans");
    verdict_from_flag("policy", violated, severity, reasons, spans, raw.clone())
}
