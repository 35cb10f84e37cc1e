//! Adapter for the `toxicity` analyzer.
//!
//! Expected schema: `{ "score": 0.0..1.0, "reasons"?: [string] }`.
//! Toxicity analyzers are typically score-only (no span localization),
//! so severity is derived by bucketing the score.

use super::{f64_field, reasons_field};
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

/// Maps a `[0.0, 1.0]` confidence score to the protocol's `[0,4]`
/// severity scale. The buckets are intentionally coarse: a score-only
/// analyzer cannot distinguish "mildly rude" from "slightly more rude"
/// with any more precision than this.
pub(crate) fn severity_from_score(score: f64) -> u8 {
    if score >= 0.9 {
        4
    } else if score >= 0.75 {
        3
    } else if score >= 0.5 {
        2
    } else if score >= 0.25 {
        1
    } else {
        0
    }
}

pub fn adapt(raw: &Value) -> Verdict {
    let Some(score) = f64_field(raw, "score") else {
        return Verdict::error("toxicity", "malformed response: missing numeric 'score'");
    };
    let severity = severity_from_score(score);
    let flagged = severity > 0;
    let mut reasons = reasons_field(raw, "reasons");
    if reasons.is_empty() && flagged {
        reasons.push(format!("toxicity_score:{score:.2}"));
    }

    Verdict {
        name: "toxicity".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity,
        reasons,
        spans: Vec::new(),
        raw: raw.clone(),
    }
}
