//! Fan-out executor (component C4).
//!
//! Runs every analyzer in a [`Plan`] concurrently, each in its own
//! `tokio::spawn`ed task so that one analyzer's slow or failing call
//! never delays or cancels another's. Two nested deadlines apply:
//! the per-call timeout (wraps one [`mg_analyzers::AnalyzerClient::call`]
//! invocation, including its single permitted retry) and the global
//! request deadline (a shared [`tokio::time::Instant`] every task races
//! against independently).

use crate::breaker::{Admission, CallOutcome as BreakerOutcome};
use crate::state::AppState;
use mg_analyzers::{AnalyzerRequest, CallOutcome};
use mg_domain::trace::TraceEvent;
use mg_domain::types::{NormalizedRequest, Plan, Verdict};
use std::collections::HashMap;
use std::time::Instant as StdInstant;
use tokio::time::Instant;

pub async fn execute(
    plan: &Plan,
    req: &NormalizedRequest,
    state: &AppState,
    request_id: &str,
) -> HashMap<String, Verdict> {
    let deadline = Instant::now() + state.config.global_deadline;
    let action_on_fail = action_on_fail_str(plan.action_on_fail);

    let mut handles = Vec::with_capacity(plan.analyzers.len());
    for name in &plan.analyzers {
        let name = name.clone();
        let name_for_task = name.clone();
        let state = state.clone();
        let text = req.text.clone();
        let return_spans = req.return_spans;
        let entities = req.entities.clone();
        let request_id = request_id.to_string();

        let handle = tokio::spawn(async move {
            let name = name_for_task;
            let fut = run_one(
                &name,
                &text,
                return_spans,
                entities.as_deref(),
                action_on_fail,
                &state,
                &request_id,
            );
            match tokio::time::timeout_at(deadline, fut).await {
                Ok(verdict) => verdict,
                Err(_) => Verdict::error(&name, "timeout"),
            }
        });
        handles.push((name, handle));
    }

    let mut results = HashMap::with_capacity(handles.len());
    for (name, handle) in handles {
        let verdict = handle
            .await
            .unwrap_or_else(|_| Verdict::error(&name, "analyzer task panicked"));
        results.insert(name, verdict);
    }
    results
}

fn action_on_fail_str(action: mg_domain::types::ActionOnFail) -> &'static str {
    use mg_domain::types::ActionOnFail::*;
    match action {
        Pass => "pass",
        Mask => "mask",
        Filter => "filter",
        Refrain => "refrain",
        Reask => "reask",
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_one(
    name: &str,
    text: &str,
    return_spans: bool,
    entities: Option<&[String]>,
    action_on_fail: &'static str,
    state: &AppState,
    request_id: &str,
) -> Verdict {
    let breaker = match state.breakers.get(name) {
        Some(b) => b,
        None => return Verdict::error(name, "no circuit breaker configured for this analyzer"),
    };

    let guard = match breaker.admit() {
        Admission::Admitted(ticket) => breaker.guard(ticket),
        Admission::ShortCircuited => {
            TraceEvent::AnalyzerShortCircuited {
                request_id: request_id.to_string(),
                analyzer: name.to_string(),
                breaker_state: breaker.state().label().to_string(),
            }
            .emit();

            if name == "policy" {
                if let Some(rule) = mg_analyzers::fallback::classify(text) {
                    TraceEvent::PolicyFallbackFired {
                        request_id: request_id.to_string(),
                        rule: rule.to_string(),
                    }
                    .emit();
                    return Verdict::policy_fallback(rule);
                }
            }
            return Verdict::short_circuited(name);
        }
    };

    let cfg = match state.config.analyzer(name) {
        Some(c) => c,
        None => {
            guard.failure();
            return Verdict::error(name, "no endpoint configured for this analyzer");
        }
    };

    let per_call_timeout = cfg.per_call_timeout.unwrap_or(state.config.per_call_timeout);
    let pii_entities = if name == "pii" { entities } else { None };
    let request = AnalyzerRequest {
        text,
        return_spans,
        entities: pii_entities,
        action_on_fail,
    };

    let started = StdInstant::now();
    let call = tokio::time::timeout(per_call_timeout, state.client.call(cfg, &request)).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match call {
        Err(_) => {
            guard.failure();
            TraceEvent::AnalyzerCall {
                request_id: request_id.to_string(),
                analyzer: name.to_string(),
                status: 0,
                duration_ms,
                attempt: 1,
            }
            .emit();
            Verdict::error(name, "timeout")
        }
        Ok(CallOutcome::Success(raw)) => {
            guard.success();
            TraceEvent::AnalyzerCall {
                request_id: request_id.to_string(),
                analyzer: name.to_string(),
                status: 200,
                duration_ms,
                attempt: 1,
            }
            .emit();
            mg_analyzers::adapt(name, &raw)
        }
        Ok(CallOutcome::Transport(msg)) => {
            guard.failure();
            Verdict::error(name, format!("transport error: {msg}"))
        }
        Ok(CallOutcome::Status { code, body }) => {
            guard.failure();
            Verdict::error(name, format!("upstream returned status {code}: {}", truncate(&body, 200)))
        }
        Ok(CallOutcome::MalformedJson(msg)) => {
            guard.failure();
            Verdict::error(name, format!("malformed response body: {msg}"))
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect::<String>() + "…"
    }
}
