//! Request Normalizer (component C1).
//!
//! Pure and deterministic: no I/O beyond parsing, and no knowledge of
//! analyzers. Two responsibilities, each with its own entry point:
//! authentication ([`check_api_key`]) and body validation ([`normalize`]).

use crate::error::GatewayError;
use crate::state::AppState;
use mg_domain::config::GatewayConfig;
use mg_domain::types::{ModerationRequest, NormalizedRequest};
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};

/// Checks `provided` against the configured allow-list in constant time
/// with respect to key content (each comparison is a fixed-length
/// digest `ct_eq`, and every configured key is always compared — no
/// early return on the first match). An empty allow-list is treated as
/// "authentication disabled" for local development, matching how the
/// rest of this codebase treats an absent shared secret.
pub fn check_api_key(state: &AppState, provided: Option<&str>) -> Result<(), GatewayError> {
    if state.api_key_hashes.is_empty() {
        return Ok(());
    }
    let provided = provided.ok_or(GatewayError::Unauthenticated)?;
    if provided.is_empty() {
        return Err(GatewayError::Unauthenticated);
    }

    let provided_hash = Sha256::digest(provided.as_bytes());
    let mut matched = Choice::from(0u8);
    for allowed in &state.api_key_hashes {
        matched |= provided_hash.ct_eq(allowed);
    }

    if bool::from(matched) {
        Ok(())
    } else {
        Err(GatewayError::Unauthenticated)
    }
}

/// Validates and normalizes the request body. `forced_checks`, when
/// `Some`, overrides the body's own `checks` map — used by the
/// single-analyzer `/{analyzer}` routes, which force `{name: true}`
/// and all others false regardless of what the caller sent.
pub fn normalize(
    config: &GatewayConfig,
    body: &[u8],
    forced_checks: Option<std::collections::HashMap<String, bool>>,
) -> Result<NormalizedRequest, GatewayError> {
    let req: ModerationRequest = serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidInput(format!("malformed request body: {e}")))?;

    let trimmed = req.text.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::InvalidInput("'text' must be non-empty".into()));
    }
    if req.text.len() > config.max_text_bytes {
        return Err(GatewayError::InvalidInput(format!(
            "'text' exceeds the {}-byte limit",
            config.max_text_bytes
        )));
    }

    let action_on_fail = req.action_on_fail.unwrap_or_default();
    let checks = forced_checks.unwrap_or(req.checks);

    Ok(NormalizedRequest {
        text: req.text,
        checks,
        action_on_fail,
        return_spans: req.return_spans,
        entities: req.entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_domain::types::ActionOnFail;

    fn cfg() -> GatewayConfig {
        let mut cfg = GatewayConfig::from_env();
        cfg.max_text_bytes = 100;
        cfg
    }

    #[test]
    fn rejects_empty_text() {
        let err = normalize(&cfg(), br#"{"text": "   "}"#, None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn rejects_missing_text_field() {
        let err = normalize(&cfg(), br#"{"checks": {}}"#, None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn rejects_oversize_text() {
        let big = "a".repeat(200);
        let body = serde_json::json!({"text": big}).to_string();
        let err = normalize(&cfg(), body.as_bytes(), None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn rejects_unrecognized_action_on_fail() {
        let body = br#"{"text": "hello there", "action_on_fail": "bogus"}"#;
        let err = normalize(&cfg(), body, None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn defaults_action_on_fail_to_filter() {
        let req = normalize(&cfg(), br#"{"text": "hello there"}"#, None).unwrap();
        assert_eq!(req.action_on_fail, ActionOnFail::Filter);
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let body = br#"{"text": "hello there", "future_field": 123}"#;
        assert!(normalize(&cfg(), body, None).is_ok());
    }

    #[test]
    fn forced_checks_override_body_checks() {
        let mut forced = std::collections::HashMap::new();
        forced.insert("pii".to_string(), true);
        let body = br#"{"text": "hello there", "checks": {"policy": true}}"#;
        let req = normalize(&cfg(), body, Some(forced)).unwrap();
        assert_eq!(req.checks.get("pii"), Some(&true));
        assert_eq!(req.checks.get("policy"), None);
    }
}
