use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inbound request
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Raw inbound JSON body for `/validate` and `/{analyzer}`.
///
/// Unknown top-level fields are ignored by serde's default behaviour,
/// which keeps the gateway forward-compatible with newer client SDKs.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationRequest {
    pub text: String,
    #[serde(default)]
    pub checks: HashMap<String, bool>,
    #[serde(default)]
    pub action_on_fail: Option<ActionOnFail>,
    #[serde(default)]
    pub return_spans: bool,
    #[serde(default)]
    pub entities: Option<Vec<String>>,
}

/// Mitigation action applied to flagged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOnFail {
    Pass,
    Mask,
    Filter,
    Refrain,
    Reask,
}

impl Default for ActionOnFail {
    fn default() -> Self {
        ActionOnFail::Filter
    }
}

/// A request after C1 normalization: authenticated, validated, and with
/// `action_on_fail` resolved to its canonical enum value.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub text: String,
    pub checks: HashMap<String, bool>,
    pub action_on_fail: ActionOnFail,
    pub return_spans: bool,
    pub entities: Option<Vec<String>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The set of analyzers to invoke for one request, plus the effective
/// mitigation action. Ordering follows analyzer priority (see
/// `mg_domain::priority`) so downstream assembly is deterministic.
#[derive(Debug, Clone)]
pub struct Plan {
    pub analyzers: Vec<String>,
    pub action_on_fail: ActionOnFail,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Verdicts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Flagged,
    Error,
    Skipped,
    ShortCircuited,
}

/// A half-open `[start, end)` span over UTF-8 code points of the
/// original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// The normalized, per-analyzer result produced by an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub name: String,
    pub outcome: Outcome,
    pub severity: u8,
    pub reasons: Vec<String>,
    pub spans: Vec<Span>,
    pub raw: serde_json::Value,
}

impl Verdict {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Pass,
            severity: 0,
            reasons: Vec::new(),
            spans: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn error(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Error,
            severity: 0,
            reasons: vec![reason.into()],
            spans: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn short_circuited(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::ShortCircuited,
            severity: 0,
            reasons: Vec::new(),
            spans: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    /// Upgrades a benign short-circuit verdict into a fired policy
    /// fallback verdict. Only ever called for the `policy` analyzer.
    pub fn policy_fallback(rule: &str) -> Self {
        Self {
            name: "policy".to_string(),
            outcome: Outcome::Flagged,
            severity: 4,
            reasons: vec![format!("policy_fallback:{rule}")],
            spans: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn is_benign(&self) -> bool {
        match self.outcome {
            Outcome::Pass | Outcome::Skipped => true,
            Outcome::ShortCircuited => self.severity == 0,
            Outcome::Flagged | Outcome::Error => false,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound response
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Pass,
    Fixed,
    Blocked,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedResponse {
    pub status: ResponseStatus,
    pub clean_text: String,
    pub blocked_categories: Vec<String>,
    pub reasons: Vec<String>,
    pub results: HashMap<String, Verdict>,
}
