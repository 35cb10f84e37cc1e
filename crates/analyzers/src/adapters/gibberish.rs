//! Adapter for the `gibberish` analyzer.
//!
//! Expected schema: `{ "score": 0.0..1.0 }` where the score is the
//! probability that the text is non-linguistic noise. Gibberish never
//! rises above severity 2 — low-quality text is a mitigation candidate,
//! not a block-worthy policy violation.

use super::f64_field;
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(score) = f64_field(raw, "score") else {
        return Verdict::error("gibberish", "malformed response: missing numeric 'score'");
    };
    let severity = if score >= 0.8 {
        2
    } else if score >= 0.5 {
        1
    } else {
        0
    };
    let flagged = severity > 0;
    let reasons = if flagged {
        vec![format!("gibberish_score:{score:.2}")]
    } else {
        Vec::new()
    };

    Verdict {
        name: "gibberish".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity,
        reasons,
        spans: Vec::new(),
        raw: raw.clone(),
    }
}
