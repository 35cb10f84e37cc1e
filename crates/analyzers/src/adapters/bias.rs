//! Adapter for the `bias` analyzer.
//!
//! Expected schema: `{ "score": 0.0..1.0, "categories"?: [string] }`.
//! Shares its scoring scale with [`super::toxicity`] but reports
//! flagged categories instead of free-form reasons.

use super::f64_field;
use crate::adapters::toxicity::severity_from_score;
use mg_domain::types::{Outcome, Verdict};
use serde_json::Value;

pub fn adapt(raw: &Value) -> Verdict {
    let Some(score) = f64_field(raw, "score") else {
        return Verdict::error("bias", "malformed response: missing numeric 'score'");
    };
    let severity = severity_from_score(score);
    let flagged = severity > 0;
    let categories: Vec<String> = raw
        .get("categories")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();
    let reasons = if flagged {
        if categories.is_empty() {
            vec![format!("bias_score:{score:.2}")]
        } else {
            categories.iter().map(|c| format!("bias:{c}")).collect()
        }
    } else {
        Vec::new()
    };

    Verdict {
        name: "bias".to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity,
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
    fn flagged_with_categories() {
        let v = adapt(&json!({"score": 0.8, "categories": ["gender"]}));
        assert_eq!(v.outcome, Outcome::Flagged);
        assert_eq!(v.reasons, vec!["bias:gender"]);
    }

    #[test]
    fn low_score_passes() {
        let v = adapt(&json!({"score": 0.0}));
        assert_eq!(v.outcome, Outcome::Pass);
    }
}
