//! Adapter for the `secrets` analyzer.
//!
//! Expected schema: `{ "found": bool, "severity"?: 0..4, "reasons"?:
//! [string], "matches"?: [{start,end,label?,replacement?}] }`. Uses
//! `matches` rather than `spans` as its field name for flagged regions —
//! adapters exist precisely to paper over this kind of per-analyzer
//! naming drift.

use super::{bool_field, reasons_field, severity_field, spans_field, verdict_from_flag};
use mg_domain::types::Verdict;
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(found) = bool_field(raw, "found") else {
        return Verdict::error("secrets", "malformed response: missing boolean 'found'");
    };
    let severity = severity_field(raw, "severity", 4);
    let reasons = reasons_field(raw, "reasons");
    let spans = spans_field(raw, "matches");
    verdict_from_flag("secrets", found, severity, reasons, spans, raw.clone())
}
