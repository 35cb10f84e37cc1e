//! Sanitizer — text mitigation half of component C5 (Stage B).
//!
//! Takes the status decided by [`crate::aggregator::aggregate`] and the
//! request's `action_on_fail` and produces the `clean_text` the caller
//! gets back. All span math operates on UTF-8 code points, never bytes,
//! so multi-byte characters are never split.

use mg_domain::types::{ActionOnFail, Outcome, ResponseStatus, Span, Verdict};
use std::collections::HashMap;

const REASK_MESSAGE: &str = "Your input could not be processed; please rephrase.";

pub fn sanitize(
    status: ResponseStatus,
    action: ActionOnFail,
    text: &str,
    plan_order: &[String],
    verdicts: &HashMap<String, Verdict>,
    mask_token: &str,
) -> String {
    match status {
        ResponseStatus::Blocked => String::new(),
        // Nothing to assess safely; fail closed rather than echo text
        // that was never actually cleared by any analyzer.
        ResponseStatus::Error => String::new(),
        ResponseStatus::Pass => text.to_string(),
        ResponseStatus::Fixed => match action {
            ActionOnFail::Pass => text.to_string(),
            ActionOnFail::Refrain => String::new(),
            ActionOnFail::Reask => REASK_MESSAGE.to_string(),
            ActionOnFail::Mask => {
                let spans = collect_flagged_spans(plan_order, verdicts);
                rewrite(text, &spans, |_| mask_token.to_string())
            }
            ActionOnFail::Filter => {
                let spans = collect_flagged_spans(plan_order, verdicts);
                let rewritten = rewrite(text, &spans, |s| s.replacement.clone().unwrap_or_default());
                collapse_whitespace(&rewritten)
            }
        },
    }
}

/// Gathers every flagged verdict's spans in analyzer-priority order
/// (so ties at the same `start` resolve in favor of the
/// higher-priority analyzer) and merges overlaps across analyzers.
fn collect_flagged_spans(plan_order: &[String], verdicts: &HashMap<String, Verdict>) -> Vec<Span> {
    let mut spans = Vec::new();
    for name in plan_order {
        if let Some(v) = verdicts.get(name) {
            if v.outcome == Outcome::Flagged {
                spans.extend(v.spans.iter().cloned());
            }
        }
    }
    mg_domain::span::merge_overlapping(spans)
}

/// Replaces each span (already merged, ascending, non-overlapping) with
/// whatever `replace` returns for it, operating on code points so a
/// span boundary can never land inside a multi-byte character.
fn rewrite(text: &str, spans: &[Span], mut replace: impl FnMut(&Span) -> String) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for span in spans {
        let start = span.start.min(chars.len());
        let end = span.end.min(chars.len()).max(start);
        if start > cursor {
            out.extend(chars[cursor..start].iter());
        }
        out.push_str(&replace(span));
        cursor = end;
    }
    if cursor < chars.len() {
        out.extend(chars[cursor..].iter());
    }
    out
}

/// Collapses any run of whitespace into a single space. Used only for
/// `filter`, where removing a span's content (empty replacement) can
/// leave the surrounding whitespace doubled up.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_ws {
                out.push(' ');
            }
            prev_ws = true;
        } else {
            out.push(c);
            prev_ws = false;
        }
    }
    out
}
