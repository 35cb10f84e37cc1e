//! End-to-end scenarios driven through the real axum router, against a
//! local mock analyzer server (no external network, no mocking crate —
//! just a second, smaller axum app bound to an ephemeral port).

use axum::extract::Path as AxumPath;
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use mg_domain::config::GatewayConfig;
use mg_domain::types::{ResponseStatus, UnifiedResponse};
use mg_gateway::api::build_router;
use mg_gateway::state::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;

/// A mock upstream analyzer server. Every route inspects the request
/// body's `text` field and returns a canned response driven by simple
/// sentinel substrings, so one server can stand in for all nine
/// analyzers across every scenario below.
async fn spawn_mock_analyzers() -> String {
    async fn handle(AxumPath(name): AxumPath<String>, Json(body): Json<Value>) -> Json<Value> {
        let text = body.get("text").and_then(Value::as_str).unwrap_or("");
        let response = match name.as_str() {
            "policy" if text.contains("BOOM") => {
                json!({"violated": true, "severity": 4, "reasons": ["mock_policy_violation"]})
            }
            "policy" => json!({"violated": false}),
            "secrets" if text.contains("sk-live-SECRET123") => {
                let start = text.find("sk-live-SECRET123").unwrap();
                let end = start + "sk-live-SECRET123".chars().count();
                json!({
                    "found": true,
                    "severity": 2,
                    "reasons": ["api_key_leak"],
                    "matches": [{"start": start, "end": end, "label": "api_key"}],
                })
            }
            "secrets" => json!({"found": false}),
            "pii" if text.contains('@') => {
                let at_pos = text.find('@').unwrap();
                let start = text[..at_pos].rfind(' ').map(|i| i + 1).unwrap_or(0);
                let end = text[at_pos..]
                    .find(' ')
                    .map(|i| at_pos + i)
                    .unwrap_or(text.len());
                json!({
                    "entities": [{"start": start, "end": end, "label": "email", "replacement": "[EMAIL]"}],
                })
            }
            "pii" => json!({"entities": []}),
            _ => json!({"violated": false, "score": 0.0, "status": "clear", "valid": true}),
        };
        Json(response)
    }

    async fn always_fails() -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }

    let app = Router::new()
        .route("/:name", post(handle))
        .route("/flaky", post(always_fails));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_against(base_url: &str) -> GatewayConfig {
    let mut cfg = GatewayConfig::from_env();
    cfg.api_keys.clear();
    cfg.per_call_timeout = std::time::Duration::from_millis(500);
    cfg.global_deadline = std::time::Duration::from_secs(2);
    for (name, analyzer) in cfg.analyzers.iter_mut() {
        analyzer.url = format!("{base_url}/{name}");
    }
    cfg
}

async fn post_validate(app: Router, body: Value) -> (axum::http::StatusCode, UnifiedResponse) {
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/validate")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn s1_benign_greeting_passes_through_unmodified() {
    let base = spawn_mock_analyzers().await;
    let app = build_router(AppState::new(config_against(&base)));
    let (status, resp) = post_validate(app, json!({"text": "Hello, how are you today?"})).await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(resp.status, ResponseStatus::Pass);
    assert_eq!(resp.clean_text, "Hello, how are you today?");
    assert!(resp.blocked_categories.is_empty());
}

#[tokio::test]
async fn s2_secret_token_is_masked() {
    let base = spawn_mock_analyzers().await;
    let app = build_router(AppState::new(config_against(&base)));
    let mut checks = HashMap::new();
    checks.insert("secrets", true);
    let (status, resp) = post_validate(
        app,
        json!({
            "text": "my key is sk-live-SECRET123",
            "checks": checks,
            "action_on_fail": "mask",
        }),
    )
    .await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(resp.status, ResponseStatus::Fixed);
    assert_eq!(resp.clean_text, "my key is ***");
    assert_eq!(resp.blocked_categories, vec!["secrets"]);
}

#[tokio::test]
async fn s3_email_is_filtered_with_replacement() {
    let base = spawn_mock_analyzers().await;
    let app = build_router(AppState::new(config_against(&base)));
    let mut checks = HashMap::new();
    checks.insert("pii", true);
    let (status, resp) = post_validate(
        app,
        json!({
            "text": "Email me at jane@example.com",
            "checks": checks,
            "action_on_fail": "filter",
        }),
    )
    .await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(resp.status, ResponseStatus::Fixed);
    assert_eq!(resp.clean_text, "Email me at [EMAIL]");
    assert_eq!(resp.blocked_categories, vec!["pii"]);
}

#[tokio::test]
async fn s4_severity_four_policy_violation_blocks_and_empties_text() {
    let base = spawn_mock_analyzers().await;
    let app = build_router(AppState::new(config_against(&base)));
    let mut checks = HashMap::new();
    checks.insert("policy", true);
    let (status, resp) = post_validate(
        app,
        json!({"text": "BOOM this is bad content", "checks": checks}),
    )
    .await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(resp.status, ResponseStatus::Blocked);
    assert_eq!(resp.clean_text, "");
    assert_eq!(resp.blocked_categories, vec!["policy"]);
    assert!(resp.reasons.iter().any(|r| r == "mock_policy_violation"));
}

#[tokio::test]
async fn s5_reask_action_returns_fixed_reask_message() {
    let base = spawn_mock_analyzers().await;
    let app = build_router(AppState::new(config_against(&base)));
    let mut checks = HashMap::new();
    checks.insert("pii", true);
    let (status, resp) = post_validate(
        app,
        json!({
            "text": "Email me at jane@example.com",
            "checks": checks,
            "action_on_fail": "reask",
        }),
    )
    .await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(resp.status, ResponseStatus::Fixed);
    assert_eq!(
        resp.clean_text,
        "Your input could not be processed; please rephrase."
    );
}

#[tokio::test]
async fn s6_repeated_upstream_failures_open_the_breaker_and_short_circuit() {
    let base = spawn_mock_analyzers().await;
    let mut cfg = config_against(&base);
    cfg.breaker.failure_threshold = 2;
    if let Some(secrets) = cfg.analyzers.get_mut("secrets") {
        secrets.url = format!("{base}/flaky");
    }
    let state = AppState::new(cfg);
    let app = build_router(state.clone());

    let mut checks = HashMap::new();
    checks.insert("secrets", true);
    let body = json!({"text": "anything at all", "checks": checks});

    // First two calls hit the flaky upstream and fail; the breaker opens
    // on the second failure (failure_threshold = 2).
    for _ in 0..2 {
        let (status, resp) = post_validate(app.clone(), body.clone()).await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(resp.results.get("secrets").unwrap().outcome, mg_domain::types::Outcome::Error);
    }

    // Third call should be short-circuited without touching the network.
    let (status, resp) = post_validate(app.clone(), body).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(
        resp.results.get("secrets").unwrap().outcome,
        mg_domain::types::Outcome::ShortCircuited
    );
    assert_eq!(state.breakers.snapshot().get("secrets"), Some(&"open"));
}
