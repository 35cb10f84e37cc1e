//! HTTP surface: `POST /validate`, `POST /{analyzer}`, `GET /health`.
//!
//! Handlers are thin — they wire C1 through C5 together and translate
//! the result into a response. All actual policy lives in the modules
//! they call.

use crate::error::GatewayError;
use crate::state::AppState;
use crate::{aggregator, executor, normalizer, router, sanitizer};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use mg_domain::priority::ANALYZER_PRIORITY;
use mg_domain::trace::TraceEvent;
use mg_domain::types::UnifiedResponse;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/validate", post(validate))
        .route("/health", get(health))
        .route("/:analyzer", post(single_analyzer))
        .with_state(state)
}

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UnifiedResponse>, GatewayError> {
    if state.is_shutting_down() {
        return Err(GatewayError::ShuttingDown);
    }
    normalizer::check_api_key(&state, extract_api_key(&headers))?;
    let normalized = normalizer::normalize(&state.config, &body, None)?;
    run_pipeline(&state, normalized, false).await
}

async fn single_analyzer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(analyzer): Path<String>,
    body: Bytes,
) -> Result<Json<UnifiedResponse>, GatewayError> {
    if state.is_shutting_down() {
        return Err(GatewayError::ShuttingDown);
    }
    if !ANALYZER_PRIORITY.contains(&analyzer.as_str()) {
        return Err(GatewayError::InvalidInput(format!(
            "unknown analyzer '{analyzer}'"
        )));
    }
    normalizer::check_api_key(&state, extract_api_key(&headers))?;

    let mut forced = HashMap::new();
    forced.insert(analyzer, true);
    let normalized = normalizer::normalize(&state.config, &body, Some(forced))?;
    run_pipeline(&state, normalized, true).await
}

async fn run_pipeline(
    state: &AppState,
    normalized: mg_domain::types::NormalizedRequest,
    explicit: bool,
) -> Result<Json<UnifiedResponse>, GatewayError> {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let plan = router::route(&normalized);

    TraceEvent::RequestRouted {
        request_id: request_id.clone(),
        analyzers: plan.analyzers.clone(),
        action_on_fail: format!("{:?}", plan.action_on_fail).to_lowercase(),
        explicit,
    }
    .emit();

    let verdicts = executor::execute(&plan, &normalized, state, &request_id).await;
    let (status, blocked_categories) = aggregator::aggregate(&plan.analyzers, &verdicts);
    let reasons = aggregator::collect_reasons(&plan.analyzers, &verdicts);
    let clean_text = sanitizer::sanitize(
        status,
        plan.action_on_fail,
        &normalized.text,
        &plan.analyzers,
        &verdicts,
        &state.config.mask_token,
    );

    TraceEvent::RequestCompleted {
        request_id,
        status: format!("{status:?}").to_lowercase(),
        blocked_categories: blocked_categories.clone(),
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();

    Ok(Json(UnifiedResponse {
        status,
        clean_text,
        blocked_categories,
        reasons,
        results: verdicts,
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "breakers": state.breakers.snapshot(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use mg_domain::config::GatewayConfig;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut cfg = GatewayConfig::from_env();
        cfg.api_keys.clear();
        // Point every analyzer at an address nothing is listening on so
        // calls fail fast via connection refusal rather than hanging.
        for analyzer in cfg.analyzers.values_mut() {
            analyzer.url = "http://127.0.0.1:1/x".to_string();
        }
        cfg.per_call_timeout = std::time::Duration::from_millis(100);
        cfg.global_deadline = std::time::Duration::from_secs(1);
        AppState::new(cfg)
    }

    #[tokio::test]
    async fn health_reports_ok_and_all_breakers_closed() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["breakers"]["policy"], "closed");
    }

    #[tokio::test]
    async fn validate_rejects_empty_body_with_400() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_single_analyzer_route_is_400() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/not_a_real_analyzer")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(r#"{"text": "hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validate_with_all_analyzers_down_returns_error_status() {
        let app = build_router(test_state());
        let mut checks = HashMap::new();
        checks.insert("policy".to_string(), true);
        let body = serde_json::json!({"text": "hello there", "checks": checks}).to_string();
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: UnifiedResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.status, mg_domain::types::ResponseStatus::Error);
        assert_eq!(parsed.clean_text, "");
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected_when_keys_are_configured() {
        let mut cfg = GatewayConfig::from_env();
        cfg.api_keys = vec!["secret-key".to_string()];
        let state = AppState::new(cfg);
        let app = build_router(state);
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(r#"{"text": "hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn shutting_down_rejects_new_requests_with_503() {
        let state = test_state();
        state.begin_shutdown();
        let app = build_router(state);
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(r#"{"text": "hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
