//! Aggregator — verdict aggregation half of component C5 (Stage A).
//!
//! Pure function of the verdict map: decides the overall `status` and
//! which analyzers land in `blocked_categories`, in the fixed
//! analyzer-priority order so that response assembly is byte-stable
//! for identical inputs.

use mg_domain::types::{Outcome, ResponseStatus, Verdict};
use std::collections::HashMap;

/// `plan_order` must already be sorted by analyzer priority (as
/// produced by the Router) — this function trusts that ordering rather
/// than re-deriving it.
pub fn aggregate(
    plan_order: &[String],
    verdicts: &HashMap<String, Verdict>,
) -> (ResponseStatus, Vec<String>) {
    let blocked: Vec<String> = plan_order
        .iter()
        .filter(|name| {
            verdicts.get(*name).is_some_and(|v| {
                v.severity == 4 && matches!(v.outcome, Outcome::Flagged | Outcome::ShortCircuited)
            })
        })
        .cloned()
        .collect();

    if !blocked.is_empty() {
        return (ResponseStatus::Blocked, blocked);
    }

    let fixed: Vec<String> = plan_order
        .iter()
        .filter(|name| {
            verdicts.get(*name).is_some_and(|v| {
                v.outcome == Outcome::Flagged && (!v.spans.is_empty() || v.severity >= 2)
            })
        })
        .cloned()
        .collect();

    if !fixed.is_empty() {
        return (ResponseStatus::Fixed, fixed);
    }

    // No severity-4 block and nothing actionable enough to mitigate.
    // Surface `error` only when literally every planned analyzer errored
    // and the policy fallback never fired (a fired fallback would have
    // produced a severity-4 Flagged verdict, caught above).
    let all_errored = !plan_order.is_empty()
        && plan_order
            .iter()
            .all(|name| verdicts.get(name).is_some_and(|v| v.outcome == Outcome::Error));

    if all_errored {
        (ResponseStatus::Error, Vec::new())
    } else {
        (ResponseStatus::Pass, Vec::new())
    }
}

/// Concatenates every verdict's `reasons` in analyzer-priority order,
/// de-duplicating while preserving first occurrence.
pub fn collect_reasons(plan_order: &[String], verdicts: &HashMap<String, Verdict>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut reasons = Vec::new();
    for name in plan_order {
        if let Some(v) = verdicts.get(name) {
            for r in &v.reasons {
                if seen.insert(r.clone()) {
                    reasons.push(r.clone());
                }
            }
        }
    }
    reasons
}
