//! Outbound HTTP client for analyzer calls.
//!
//! Grounded on the same "typed client, retry-aware post" shape used
//! elsewhere in this codebase for outbound REST calls, narrowed to the
//! single retry rule the gateway needs: retry at most once, only on a
//! transport-level error or a 5xx status, never on 4xx and never on a
//! timeout (the timeout is enforced by the caller wrapping the whole
//! `call` in `tokio::time::timeout`, so it can never observe this retry
//! at all).

use mg_domain::config::AnalyzerConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Wire payload sent to every analyzer.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerRequest<'a> {
    pub text: &'a str,
    pub return_spans: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<&'a [String]>,
    pub action_on_fail: &'static str,
}

/// The outcome of a single (possibly retried) analyzer call.
#[derive(Debug)]
pub enum CallOutcome {
    /// A 2xx response whose body parsed as JSON.
    Success(Value),
    /// A network-level failure: DNS, connect, send, or response-parse
    /// error below the HTTP layer.
    Transport(String),
    /// A non-2xx HTTP status. `body` is the raw text for diagnostics.
    Status { code: u16, body: String },
    /// A 2xx response whose body did not parse as JSON.
    MalformedJson(String),
}

impl CallOutcome {
    pub fn is_retriable(&self) -> bool {
        matches!(self, CallOutcome::Transport(_))
            || matches!(self, CallOutcome::Status { code, .. } if *code >= 500)
    }
}

pub struct AnalyzerClient {
    http: reqwest::Client,
}

impl AnalyzerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .build()
                .expect("failed to build reqwest client"),
        }
    }

    /// Issues the call, retrying at most once per the rule above. Both
    /// attempts run inside whatever deadline the caller applies.
    pub async fn call(&self, cfg: &AnalyzerConfig, req: &AnalyzerRequest<'_>) -> CallOutcome {
        let first = self.attempt(cfg, req).await;
        if first.is_retriable() {
            return self.attempt(cfg, req).await;
        }
        first
    }

    async fn attempt(&self, cfg: &AnalyzerConfig, req: &AnalyzerRequest<'_>) -> CallOutcome {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref key) = cfg.api_key {
            match HeaderValue::from_str(key) {
                Ok(val) => {
                    headers.insert("X-API-Key", val);
                }
                Err(_) => return CallOutcome::Transport("invalid API key header value".into()),
            }
        }

        let start = Instant::now();
        let result = self.http.post(&cfg.url).headers(headers).json(req).send().await;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(analyzer = %cfg.name, duration_ms, "analyzer call attempt completed");

        let resp = match result {
            Ok(r) => r,
            Err(e) => return CallOutcome::Transport(e.to_string()),
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return CallOutcome::Status {
                code: status.as_u16(),
                body,
            };
        }

        match resp.json::<Value>().await {
            Ok(v) => CallOutcome::Success(v),
            Err(e) => CallOutcome::MalformedJson(e.to_string()),
        }
    }
}

impl Default for AnalyzerClient {
    fn default() -> Self {
        Self::new()
    }
}
