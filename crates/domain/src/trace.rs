use serde::Serialize;

/// Structured trace events emitted across all gateway crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    RequestRouted {
        request_id: String,
        analyzers: Vec<String>,
        action_on_fail: String,
        explicit: bool,
    },
    AnalyzerCall {
        request_id: String,
        analyzer: String,
        status: u16,
        duration_ms: u64,
        attempt: u32,
    },
    AnalyzerShortCircuited {
        request_id: String,
        analyzer: String,
        breaker_state: String,
    },
    PolicyFallbackFired {
        request_id: String,
        rule: String,
    },
    BreakerTransition {
        analyzer: String,
        from: String,
        to: String,
    },
    RequestCompleted {
        request_id: String,
        status: String,
        blocked_categories: Vec<String>,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "mg_event");
    }
}
