//! Adapter for the `format` analyzer.
//!
//! Expected schema: `{ "valid": bool, "reasons"?: [string] }`. Format
//! violations (malformed JSON/XML/markdown, schema mismatches) are a
//! mitigation concern, not a hard block — default severity is 2.

use super::{bool_field, reasons_field};
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(valid) = bool_field(raw, "valid") else {
        return Verdict::error("format", "malformed response: missing boolean 'valid'");
    };
    let flagged = !valid;
    let reasons = reasons_field(raw, "reasons");

    Verdict {
        name: "format".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity: if flagged { 2 } else { 0 },
        reasons,
        spans: Vec::new(),
        raw: raw.clone(),
    }
}
