//! Pipeline against a mock Gemini endpoint.
//!
//! Run with: cargo test -p jadwa-runtime --test gemini_pipeline

mod common;

use std::sync::Arc;

use common::NoSleep;
use jadwa_core::{City, StudyRequest};
use jadwa_runtime::{Analyzer, RuntimeConfig};

const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const FALLBACK_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn answer_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_study_over_http() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(answer_body(r#"{"summary":"Viable","plan":"Open"}"#))
        .create_async()
        .await;

    let config = RuntimeConfig::new()
        .with_api_key("test-key")
        .with_base_url(server.url())
        .with_leads_path(None);
    let analyzer = Analyzer::from_config(config)?;

    let report = analyzer
        .run(&StudyRequest::new("Bakery", City::Jeddah, 80000.0)?)
        .await?;

    assert_eq!(report.study.summary, "Viable");
    assert_eq!(report.study.plan, "Open");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_quota_errors_switch_to_fallback_over_http() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let primary = server
        .mock("POST", PATH)
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
        .expect(2)
        .create_async()
        .await;
    let fallback = server
        .mock("POST", FALLBACK_PATH)
        .with_status(200)
        .with_body(answer_body(r#"{"summary":"From fallback"}"#))
        .expect(1)
        .create_async()
        .await;

    let config = RuntimeConfig::new()
        .with_api_key("test-key")
        .with_base_url(server.url())
        .with_max_retries(2)
        .with_leads_path(None);
    let analyzer = Analyzer::from_config(config)?.with_sleeper(Arc::new(NoSleep::default()));

    let report = analyzer
        .run(&StudyRequest::new("Bakery", City::Jeddah, 80000.0)?)
        .await?;

    assert_eq!(report.study.summary, "From fallback");
    assert_eq!(report.model_used, "gemini-2.0-flash");
    primary.assert_async().await;
    fallback.assert_async().await;
    Ok(())
}
