//! Analysis pipeline: lead log, prompts, model call, parse, assemble.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Utc};
use jadwa_core::{
    FeasibilityStudy, FinancialMetrics, Financials, ReportLanguage, ResponseMode, StudyRequest,
};
use jadwa_llms::providers::gemini::GeminiConfig;
use jadwa_llms::{GeminiProvider, GenerateOptions, Provider};
use serde::Serialize;
use tracing::Instrument;

use crate::caller::{CallOutcome, ResilientCaller};
use crate::config::RuntimeConfig;
use crate::error::{AnalysisError, Result};
use crate::leads::LeadLog;
use crate::parse::{parse, parse_delimited, parse_financials};
use crate::prompt::build_prompts;
use crate::retry::Sleeper;

/// Where the financial projection in a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialsSource {
    Model,
    /// Fixed profit curve derived from the capital.
    Heuristic,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub request: StudyRequest,
    pub study: FeasibilityStudy,
    pub metrics: FinancialMetrics,
    pub financials_source: FinancialsSource,
    /// Model that answered the primary prompt.
    pub model_used: String,
    /// Model attempts across every prompt of the run.
    pub attempts: u32,
    pub mode: ResponseMode,
    pub language: ReportLanguage,
}

pub struct Analyzer {
    config: RuntimeConfig,
    caller: ResilientCaller,
    lead_log: Option<LeadLog>,
}

impl Analyzer {
    pub fn new(config: RuntimeConfig, provider: Arc<dyn Provider>) -> Self {
        let caller = ResilientCaller::new(provider, config.retry)
            .with_fallback_model(config.fallback_model.clone());
        let lead_log = config.leads_path.clone().map(LeadLog::new);
        Self {
            config,
            caller,
            lead_log,
        }
    }

    /// Analyzer over the Gemini API. Fails with
    /// [`AnalysisError::MissingCredential`] before any network activity when
    /// no key is configured.
    pub fn from_config(config: RuntimeConfig) -> Result<Self> {
        let key = config.require_api_key()?;
        let mut gemini = GeminiConfig::new(key);
        if let Some(url) = &config.base_url {
            gemini = gemini.with_base_url(url.clone());
        }
        let provider = GeminiProvider::new(gemini)
            .map_err(|e| AnalysisError::MissingCredential(e.to_string()))?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.caller = self.caller.with_sleeper(sleeper);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.caller = self.caller.with_rng_seed(seed);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn lead_log(&self) -> Option<&LeadLog> {
        self.lead_log.as_ref()
    }

    pub async fn run(&self, request: &StudyRequest) -> Result<StudyReport> {
        let span = jadwa_observability::analysis_span!(
            request.project_name.as_str(),
            self.config.mode.as_str()
        );
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &StudyRequest) -> Result<StudyReport> {
        let started = Instant::now();
        self.log_lead(request);

        let mode = self.config.mode;
        let language = self.config.language;
        let prompts = build_prompts(request, mode, language);
        tracing::debug!(prompts = prompts.call_count(), "prompts built");

        let primary = self
            .call("study", &prompts.primary, mode == ResponseMode::Structured)
            .await
            .inspect_err(|e| jadwa_observability::record_error(e))?;
        let mut attempts = primary.attempts;

        let (study, financials_source) = match mode {
            ResponseMode::Structured => {
                let study = parse(&primary.text, mode)
                    .map_err(AnalysisError::from)
                    .inspect_err(|e| {
                        tracing::debug!(raw = %primary.text, "unparseable model answer");
                        jadwa_observability::record_error(e);
                    })?;
                (study, FinancialsSource::Model)
            }
            ResponseMode::Delimited => {
                let mut study = parse_delimited(&primary.text);
                let financials = match prompts.financials.as_deref() {
                    Some(prompt) => {
                        let (financials, used) = self.projection(prompt).await;
                        attempts += used;
                        financials
                    }
                    None => None,
                };
                match financials {
                    Some(financials) => {
                        study.financials = financials;
                        (study, FinancialsSource::Model)
                    }
                    None => {
                        tracing::warn!("no usable financial projection, using heuristic curve");
                        study.financials =
                            Financials::heuristic(request.capital, Utc::now().year());
                        (study, FinancialsSource::Heuristic)
                    }
                }
            }
        };

        let metrics = study.financials.metrics(request.capital);
        let span = tracing::Span::current();
        span.record("model", primary.model.as_str());
        span.record("attempts", attempts);
        jadwa_observability::record_duration("duration_ms", started.elapsed());
        tracing::info!(
            model = %primary.model,
            attempts,
            fallback = primary.used_fallback,
            "analysis complete"
        );

        Ok(StudyReport {
            request: request.clone(),
            study,
            metrics,
            financials_source,
            model_used: primary.model,
            attempts,
            mode,
            language,
        })
    }

    async fn call(&self, purpose: &str, prompt: &str, json_output: bool) -> Result<CallOutcome> {
        let span = jadwa_observability::model_call_span!(self.config.model.as_str(), purpose);
        let options = GenerateOptions {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            json_output,
            headers: None,
        };
        async {
            let started = Instant::now();
            let outcome = self
                .caller
                .call_with(prompt, &self.config.model, self.config.retry.max_attempts, &options)
                .await;
            jadwa_observability::record_duration("duration_ms", started.elapsed());
            if let Ok(outcome) = &outcome {
                tracing::Span::current().record("attempts", outcome.attempts);
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Ask for the projection as JSON. Any failure yields `None` so the
    /// caller can fall back to the heuristic curve. Returns attempts used.
    async fn projection(&self, prompt: &str) -> (Option<Financials>, u32) {
        match self.call("financials", prompt, true).await {
            Ok(outcome) => match parse_financials(&outcome.text) {
                Ok(financials) if !financials.rows().is_empty() => {
                    (Some(financials), outcome.attempts)
                }
                Ok(_) => {
                    tracing::warn!("financial answer had no usable rows");
                    (None, outcome.attempts)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "financial answer could not be parsed");
                    (None, outcome.attempts)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "financial projection call failed");
                let used = match &e {
                    AnalysisError::ServiceExhausted { attempts, .. } => *attempts,
                    _ => 1,
                };
                (None, used)
            }
        }
    }

    /// Lead logging never fails the analysis.
    fn log_lead(&self, request: &StudyRequest) {
        let Some(log) = &self.lead_log else {
            return;
        };
        let span = jadwa_observability::lead_log_span!(
            "append",
            log.path().display().to_string().as_str()
        );
        let _guard = span.enter();
        if let Err(e) = log.append(
            &request.project_name,
            request.city.name(),
            request.capital,
            Utc::now(),
        ) {
            tracing::warn!(error = %e, "failed to log lead");
        }
    }
}
