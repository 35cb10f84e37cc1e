//! Stable analyzer priority ordering.
//!
//! This order is the single source of truth for tie-breaks: it decides
//! `blocked_categories` ordering, `reasons` assembly order, and the
//! Router's default-set iteration order. Keeping it in one place is
//! what makes response assembly deterministic (see `Aggregator`).

pub const ANALYZER_PRIORITY: &[&str] = &[
    "policy",
    "secrets",
    "pii",
    "jailbreak",
    "toxicity",
    "bias",
    "brand",
    "gibberish",
    "format",
];

/// Index of `name` in the priority order, or `usize::MAX` if unknown
/// (unknown analyzers sort last, stably, by name).
pub fn rank(name: &str) -> usize {
    ANALYZER_PRIORITY
        .iter()
        .position(|n| *n == name)
        .unwrap_or(usize::MAX)
}

/// Sorts analyzer names in place by priority order, falling back to
/// lexicographic order for names outside the known set.
pub fn sort_by_priority(names: &mut [String]) {
    names.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
}
