use crate::types::Span;

/// Merges overlapping spans into a minimal covering set.
///
/// Input order matters for ties: when two spans share a `start`, the one
/// that appears earlier in `spans` is kept as the merged span's label and
/// replacement. Callers that need priority semantics (e.g. picking the
/// higher-priority analyzer's replacement when two analyzers' spans
/// overlap) should pre-sort by priority before calling this.
///
/// Used both by individual analyzer adapters (merging overlaps within one
/// analyzer's own result) and by the sanitizer (merging overlaps across
/// analyzers before rewriting text).
pub fn merge_overlapping(spans: Vec<Span>) -> Vec<Span> {
    let mut ordered = spans;
    ordered.sort_by_key(|s| s.start);

    let mut merged: Vec<Span> = Vec::with_capacity(ordered.len());
    for span in ordered {
        if let Some(last) = merged.last_mut() {
            if span.start < last.end {
                if span.end > last.end {
                    last.end = span.end;
                }
                continue;
            }
        }
        merged.push(span);
    }
    merged
}
