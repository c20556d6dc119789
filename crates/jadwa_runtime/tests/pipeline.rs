//! End-to-end pipeline tests with a scripted provider.
//!
//! Run with: cargo test -p jadwa-runtime --test pipeline

mod common;

use std::sync::Arc;

use common::{rate_limited, NoSleep, ScriptedProvider};
use jadwa_core::{City, ResponseMode, StudyRequest, SWOT_PLACEHOLDER};
use jadwa_runtime::{
    AdminAuth, AnalysisError, Analyzer, FinancialsSource, RuntimeConfig,
};
use tempfile::TempDir;

const STRUCTURED_ANSWER: &str = "```json\n{\"summary\":\"Viable\",\"swot\":{\"s\":\"location\",\"w\":\"rent\",\"o\":\"tourism\",\"t\":\"rivals\"},\"financials\":{\"years\":[\"2025\",\"2026\",\"2027\"],\"revenue\":[300000,420000,510000],\"profit\":[20000,60000,95000]},\"plan\":\"Open in Q1\"}\n```";

fn request() -> StudyRequest {
    StudyRequest::new("Specialty Cafe", City::Riyadh, 150000.0).unwrap()
}

fn config(dir: &TempDir) -> RuntimeConfig {
    RuntimeConfig::new()
        .with_api_key("test-key")
        .with_leads_path(Some(dir.path().join("leads.csv")))
}

#[tokio::test]
async fn test_structured_run_builds_report_and_logs_lead() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![Ok(STRUCTURED_ANSWER.into())]);
    let analyzer = Analyzer::new(config(&dir), provider.clone());

    let report = analyzer.run(&request()).await.unwrap();

    assert_eq!(report.study.summary, "Viable");
    assert_eq!(report.study.swot.threat, "rivals");
    assert_eq!(report.financials_source, FinancialsSource::Model);
    assert_eq!(report.metrics.total_profit, 175000.0);
    assert_eq!(report.metrics.payback_year.as_deref(), Some("2027"));
    assert_eq!(report.model_used, "gemini-2.5-flash");
    assert_eq!(report.attempts, 1);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].options.json_output);
    assert!(requests[0].prompt.contains("Specialty Cafe"));

    let leads = analyzer
        .lead_log()
        .unwrap()
        .read_all(&AdminAuth::from_token("admin"), "admin")
        .unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].project, "Specialty Cafe");
    assert_eq!(leads[0].city, "Riyadh");
}

#[tokio::test]
async fn test_malformed_structured_answer_is_an_error() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![Ok("Sorry, I cannot do that.".into())]);
    let analyzer = Analyzer::new(config(&dir), provider);

    let err = analyzer.run(&request()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    assert!(err.user_message().starts_with("Processing error"));
}

#[tokio::test]
async fn test_delimited_run_uses_financial_prompt() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok("Good idea.\n###SWOT###\nStrength: brand\nThreat: rivals\n###PLAN###\nHire baristas".into()),
        Ok("{\"years\": [2025, 2026], \"revenue\": [\"100,000\", 150000], \"profit\": [10000, 30000]}".into()),
    ]);
    let analyzer = Analyzer::new(config(&dir).with_mode(ResponseMode::Delimited), provider.clone());

    let report = analyzer.run(&request()).await.unwrap();

    assert_eq!(report.study.summary, "Good idea.");
    assert_eq!(report.study.swot.strength, "brand");
    assert_eq!(report.study.swot.weakness, SWOT_PLACEHOLDER);
    assert_eq!(report.study.swot.threat, "rivals");
    assert_eq!(report.study.plan, "Hire baristas");
    assert_eq!(report.study.financials.revenue, vec![100000.0, 150000.0]);
    assert_eq!(report.financials_source, FinancialsSource::Model);
    assert_eq!(report.attempts, 2);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].options.json_output);
    assert!(requests[1].options.json_output);
}

#[tokio::test]
async fn test_delimited_run_falls_back_to_heuristic() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok("Only a summary".into()),
        Ok("no json here".into()),
    ]);
    let analyzer = Analyzer::new(config(&dir).with_mode(ResponseMode::Delimited), provider);

    let report = analyzer.run(&request()).await.unwrap();

    assert_eq!(report.study.summary, "Only a summary");
    assert_eq!(report.study.plan, "");
    assert_eq!(report.financials_source, FinancialsSource::Heuristic);
    assert_eq!(report.study.financials.profit, vec![15000.0, 60000.0, 120000.0]);
    assert!(report.study.financials.revenue.is_empty());
}

#[tokio::test]
async fn test_rate_limits_then_fallback_model() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        rate_limited(),
        rate_limited(),
        rate_limited(),
        Ok(STRUCTURED_ANSWER.into()),
    ]);
    let sleeper = Arc::new(NoSleep::default());
    let analyzer = Analyzer::new(config(&dir), provider.clone())
        .with_sleeper(sleeper.clone())
        .with_rng_seed(1);

    let report = analyzer.run(&request()).await.unwrap();

    assert_eq!(report.model_used, "gemini-2.0-flash");
    assert_eq!(report.attempts, 4);
    assert_eq!(sleeper.waits().len(), 2);
    let models: Vec<String> = provider.requests().into_iter().map(|r| r.model).collect();
    assert_eq!(models.last().map(String::as_str), Some("gemini-2.0-flash"));
}

#[tokio::test]
async fn test_exhaustion_without_fallback_reports_attempts() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![rate_limited(), rate_limited()]);
    let analyzer = Analyzer::new(
        config(&dir).with_fallback_model(None).with_max_retries(2),
        provider,
    )
    .with_sleeper(Arc::new(NoSleep::default()));

    let err = analyzer.run(&request()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ServiceExhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_unwritable_lead_log_does_not_fail_analysis() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every append fail.
    let blocked = dir.path().join("leads.csv");
    std::fs::create_dir(&blocked).unwrap();
    let provider = ScriptedProvider::new(vec![Ok(STRUCTURED_ANSWER.into())]);
    let analyzer = Analyzer::new(
        RuntimeConfig::new()
            .with_api_key("k")
            .with_leads_path(Some(blocked)),
        provider,
    );

    assert!(analyzer.run(&request()).await.is_ok());
}

#[test]
fn test_missing_key_fails_before_network() {
    let err = Analyzer::from_config(RuntimeConfig::new()).err().unwrap();
    assert!(matches!(err, AnalysisError::MissingCredential(_)));
}
