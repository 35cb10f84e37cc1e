//! Router (component C2).
//!
//! Picks which analyzers run for a request. Pure function of the
//! normalized request: no I/O, no breaker awareness (that is C3/C4's
//! job).

use mg_domain::priority::sort_by_priority;
use mg_domain::types::{NormalizedRequest, Plan};
use std::collections::HashSet;

const CREDENTIAL_KEYWORDS: &[&str] = &["key", "token", "password", "secret", "sk-", "api"];
const JAILBREAK_SENTINELS: &[&str] = &[
    "ignore",
    "previous instructions",
    "system prompt",
    "dan",
    "developer mode",
];

pub fn route(req: &NormalizedRequest) -> Plan {
    let mut set: HashSet<String> = if req.checks.is_empty() {
        heuristic_default_set(&req.text)
    } else {
        HashSet::new()
    };

    // Explicit flags always win, regardless of the heuristic path above.
    for (name, enabled) in &req.checks {
        if *enabled {
            set.insert(name.clone());
        } else {
            set.remove(name);
        }
    }

    if set.is_empty() {
        set.insert("policy".to_string());
    }

    let mut analyzers: Vec<String> = set.into_iter().collect();
    sort_by_priority(&mut analyzers);

    Plan {
        analyzers,
        action_on_fail: req.action_on_fail,
    }
}

fn heuristic_default_set(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    set.insert("policy".to_string());

    if looks_sensitive(text) {
        set.insert("pii".to_string());
        set.insert("secrets".to_string());
    }

    if is_natural_language(text) {
        set.insert("toxicity".to_string());
        set.insert("bias".to_string());
    }

    if looks_like_jailbreak_attempt(text) {
        set.insert("jailbreak".to_string());
    }

    if looks_like_gibberish_candidate(text) {
        set.insert("gibberish".to_string());
    }

    set
}

fn looks_sensitive(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.contains('@')
        || has_consecutive_digits(text, 3)
        || CREDENTIAL_KEYWORDS.iter().any(|k| lower.contains(k))
        || text.chars().count() > 40
}

fn has_consecutive_digits(text: &str, run_len: usize) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn is_natural_language(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.len() >= 3 && tokens.iter().any(|t| t.chars().any(|c| c.is_alphabetic()))
}

fn looks_like_jailbreak_attempt(text: &str) -> bool {
    let lower = text.to_lowercase();
    JAILBREAK_SENTINELS.iter().any(|s| lower.contains(s)) || text.chars().count() >= 80
}

fn looks_like_gibberish_candidate(text: &str) -> bool {
    let char_count = text.chars().count();
    let non_whitespace = text.chars().filter(|c| !c.is_whitespace()).count();
    char_count >= 8 && non_whitespace < 200
}
