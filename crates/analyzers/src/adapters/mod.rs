//! Per-analyzer adapters.
//!
//! Each upstream analyzer has its own response schema. An adapter is a
//! small, pure function that knows the field names of one analyzer and
//! translates its JSON body into the common [`Verdict`] shape. Adapters
//! never panic and never propagate parse errors upward: anything
//! malformed becomes `Outcome::Error` with a diagnostic reason, so one
//! broken upstream never poisons the rest of the fan-out.
//!
//! Adding a new analyzer means writing one adapter function and one
//! `match` arm in [`adapt`] plus a config entry — no change to the
//! breaker, executor, or aggregator.

mod bias;
mod brand;
mod format;
mod gibberish;
mod jailbreak;
mod pii;
mod policy;
mod secrets;
mod toxicity;

use mg_domain::span::merge_overlapping;
use mg_domain::types::{Outcome, Span, Verdict};
use serde_json::Value;

/// Routes a raw analyzer response body to the adapter that knows its
/// schema. Unknown analyzer names (e.g. a misconfigured custom check)
/// produce a malformed-response error rather than panicking.
pub fn adapt(name: &str, raw: &Value) -> Verdict {
    match name {
        "policy" => policy::adapt(raw),
        "secrets" => secrets::adapt(raw),
        "pii" => pii::adapt(raw),
        "jailbreak" => jailbreak::adapt(raw),
        "toxicity" => toxicity::adapt(raw),
        "bias" => bias::adapt(raw),
        "brand" => brand::adapt(raw),
        "gibberish" => gibberish::adapt(raw),
        "format" => format::adapt(raw),
        other => Verdict::error(other, format!("no adapter registered for analyzer '{other}'")),
    }
}

// ── Shared field-extraction helpers ─────────────────────────────────

pub(crate) fn bool_field(raw: &Value, key: &str) -> Option<bool> {
    raw.get(key).and_then(Value::as_bool)
}

pub(crate) fn str_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

pub(crate) fn f64_field(raw: &Value, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64)
}

/// Severities above the protocol's `[0,4]` range are clamped rather than
/// rejected, since an overzealous upstream should degrade, not poison
/// the whole request.
pub(crate) fn severity_field(raw: &Value, key: &str, default: u8) -> u8 {
    raw.get(key)
        .and_then(Value::as_u64)
        .map(|n| n.min(4) as u8)
        .unwrap_or(default)
}

pub(crate) fn reasons_field(raw: &Value, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Reads a `spans` array of `{start, end, label?, replacement?}` and
/// merges any overlaps within this single analyzer's own result, per
/// the invariant that a verdict's spans never overlap each other.
pub(crate) fn spans_field(raw: &Value, key: &str) -> Vec<Span> {
    let spans: Vec<Span> = raw
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let start = item.get("start")?.as_u64()? as usize;
                    let end = item.get("end")?.as_u64()? as usize;
                    if end <= start {
                        return None;
                    }
                    let label = item
                        .get("label")
                        .and_then(Value::as_str)
                        .unwrap_or("flagged")
                        .to_string();
                    let replacement = item
                        .get("replacement")
                        .and_then(Value::as_str)
                        .map(String::from);
                    Some(Span {
                        start,
                        end,
                        label,
                        replacement,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    merge_overlapping(spans)
}

/// `Pass` when `flagged` is false; `Flagged` with `severity` when true.
pub(crate) fn verdict_from_flag(
    name: &str,
    flagged: bool,
    severity: u8,
    reasons: Vec<String>,
    spans: Vec<Span>,
    raw: Value,
) -> Verdict {
    Verdict {
        name: name.to_string(),
        outcome: if flagged { Outcome::Flagged } else { Outcome::Pass },
        severity: if flagged { severity } else { 0 },
        reasons,
        spans,
        raw,
    }
}
