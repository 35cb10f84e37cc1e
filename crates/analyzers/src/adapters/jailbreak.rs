//! Adapter for the `jailbreak` analyzer.
//!
//! Expected schema: `{ "status": "blocked" | "clear", "severity"?:
//! 0..4, "reasons"?: [string] }`.

use super::{reasons_field, severity_field, str_field};
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let flagged = match str_field(raw, "status") {
        Some("blocked") => true,
        Some("clear") => false,
        _ => {
            return Verdict::error(
                "jailbreak",
                "malformed response: 'status' must be 'blocked' or 'clear'",
            )
        }
    };
    let severity = severity_field(raw, "severity", 4);
    let reasons = reasons_field(raw, "reasons");

    Verdict {
        name: "jailbreak".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity: if flagged { severity } else { 0 },
        reasons,
        spans: Vec::new(),
        raw: raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocked_status_is_flagged() {
        let v = adapt(&json!({"status": "blocked", "severity": 3, "reasons": ["role_play_override"]}));
        assert_eq!(v.outcome, Outcome::Flagged);
        assert_eq!(v.severity, 3);
    }

    #[test]
    fn clear_status_is_pass() {
        let v = adapt(&json!({"status": "clear"}));
        assert_eq!(v.outcome, Outcome::Pass);
    }

    #[test]
    fn unknown_status_value_is_error() {
        let v = adapt(&json!({"status": "maybe"}));
        assert_eq!(v.outcome, Outcome::Error);
    }
}
