//! Resilient model caller: backoff on rate limits, then one fallback attempt.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jadwa_llms::{GenerateOptions, GenerateRequest, Provider};

use crate::error::{AnalysisError, Result};
use crate::retry::{retry_with_backoff, RetryError, RetryPolicy, Sleeper, TokioSleeper};

/// Text returned by a successful call, with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Attempts across primary and fallback models.
    pub attempts: u32,
    pub slept: Duration,
    pub used_fallback: bool,
}

pub struct ResilientCaller {
    provider: Arc<dyn Provider>,
    policy: RetryPolicy,
    fallback_model: Option<String>,
    sleeper: Arc<dyn Sleeper>,
    rng: Mutex<fastrand::Rng>,
    options: GenerateOptions,
}

impl ResilientCaller {
    pub fn new(provider: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            fallback_model: None,
            sleeper: Arc::new(TokioSleeper),
            rng: Mutex::new(fastrand::Rng::new()),
            options: GenerateOptions::default(),
        }
    }

    /// Model tried once after the primary model exhausted its attempts on
    /// rate limits. Blank names disable the fallback.
    pub fn with_fallback_model(mut self, model: Option<String>) -> Self {
        self.fallback_model = model.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Deterministic jitter.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn fallback_model(&self) -> Option<&str> {
        self.fallback_model.as_deref()
    }

    fn jitter(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.f64(),
            Err(poisoned) => poisoned.into_inner().f64(),
        }
    }

    /// Send `prompt` to `primary_model`. `max_retries` is the total number of
    /// attempts against the primary model.
    pub async fn call(
        &self,
        prompt: &str,
        primary_model: &str,
        max_retries: u32,
    ) -> Result<CallOutcome> {
        self.call_with(prompt, primary_model, max_retries, &self.options)
            .await
    }

    /// Same as [`call`](Self::call) with per-call generation options.
    pub async fn call_with(
        &self,
        prompt: &str,
        primary_model: &str,
        max_retries: u32,
        options: &GenerateOptions,
    ) -> Result<CallOutcome> {
        let request = GenerateRequest::new(primary_model, prompt).with_options(options.clone());
        let policy = self.policy.with_max_attempts(max_retries);

        let result = retry_with_backoff(
            &policy,
            self.sleeper.as_ref(),
            || self.jitter(),
            jadwa_llms::Error::is_rate_limited,
            |attempt| {
                let request = request.clone();
                let provider = Arc::clone(&self.provider);
                async move {
                    tracing::debug!(model = %request.model, attempt = attempt + 1, "calling model");
                    provider.generate(request).await
                }
            },
        )
        .await;

        match result {
            Ok(done) => Ok(CallOutcome {
                text: done.value.text,
                model: primary_model.to_string(),
                attempts: done.attempts,
                slept: done.slept,
                used_fallback: false,
            }),
            Err(RetryError::Permanent { error, .. }) => {
                tracing::error!(model = primary_model, error = %error, "model call failed");
                Err(AnalysisError::ServiceError(error.to_string()))
            }
            Err(RetryError::Exhausted {
                last,
                attempts,
                slept,
            }) => match &self.fallback_model {
                Some(fallback) => self.call_fallback(&request, fallback, attempts, slept).await,
                None => Err(AnalysisError::ServiceExhausted {
                    attempts,
                    message: last.to_string(),
                }),
            },
        }
    }

    async fn call_fallback(
        &self,
        request: &GenerateRequest,
        fallback: &str,
        attempts: u32,
        slept: Duration,
    ) -> Result<CallOutcome> {
        tracing::warn!(
            primary = %request.model,
            fallback,
            attempts,
            "primary model rate limited, trying fallback model"
        );
        let attempts = attempts + 1;
        match self.provider.generate(request.for_model(fallback)).await {
            Ok(response) => Ok(CallOutcome {
                text: response.text,
                model: fallback.to_string(),
                attempts,
                slept,
                used_fallback: true,
            }),
            Err(err) if err.is_rate_limited() => Err(AnalysisError::ServiceExhausted {
                attempts,
                message: err.to_string(),
            }),
            Err(err) => Err(AnalysisError::ServiceError(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use jadwa_llms::{Error as LlmError, GenerateResponse, Headers};

    use super::*;
    use crate::retry::testing::RecordingSleeper;

    /// Replays scripted answers and records the model of every request.
    struct ScriptedProvider {
        answers: Mutex<VecDeque<jadwa_llms::Result<String>>>,
        models: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(answers: Vec<jadwa_llms::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                models: Mutex::new(Vec::new()),
            })
        }

        fn models(&self) -> Vec<String> {
            self.models.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn provider_id(&self) -> &str {
            "scripted"
        }

        fn build_headers(&self, _custom: Option<&Headers>) -> Headers {
            Headers::new()
        }

        async fn generate(&self, request: GenerateRequest) -> jadwa_llms::Result<GenerateResponse> {
            self.models.lock().unwrap().push(request.model.clone());
            let next = self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Other("script exhausted".into())));
            next.map(|text| GenerateResponse {
                text,
                model: request.model,
                finish_reason: None,
                usage: None,
            })
        }
    }

    fn rate_limited() -> jadwa_llms::Result<String> {
        Err(LlmError::RateLimited {
            message: "RESOURCE_EXHAUSTED".into(),
            retry_after_secs: None,
        })
    }

    fn caller(provider: Arc<ScriptedProvider>, sleeper: Arc<RecordingSleeper>) -> ResilientCaller {
        let policy = RetryPolicy::default()
            .with_base_delay(Duration::from_millis(10))
            .with_max_jitter(Duration::from_millis(5));
        ResilientCaller::new(provider, policy)
            .with_sleeper(sleeper)
            .with_rng_seed(42)
    }

    #[tokio::test]
    async fn test_recovers_after_rate_limits() {
        let provider = ScriptedProvider::new(vec![rate_limited(), rate_limited(), Ok("study".into())]);
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = caller(provider.clone(), sleeper.clone())
            .call("prompt", "gemini-2.5-flash", 3)
            .await
            .unwrap();

        assert_eq!(outcome.text, "study");
        assert_eq!(outcome.attempts, 3);
        assert!(!outcome.used_fallback);
        let waits = sleeper.waits();
        assert_eq!(waits.len(), 2);
        assert!(waits[0] <= waits[1]);
        assert!(waits[0] >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_non_rate_limit_error_is_immediate() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::Api {
            status: 400,
            message: "bad request".into(),
        })]);
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = caller(provider.clone(), sleeper.clone())
            .with_fallback_model(Some("gemini-2.0-flash".into()))
            .call("prompt", "gemini-2.5-flash", 3)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ServiceError(ref m) if m.contains("bad request")));
        assert!(sleeper.waits().is_empty());
        assert_eq!(provider.models(), vec!["gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_exhausted_without_fallback() {
        let provider = ScriptedProvider::new(vec![rate_limited(), rate_limited()]);
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = caller(provider, sleeper.clone())
            .call("prompt", "gemini-2.5-flash", 2)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ServiceExhausted { attempts: 2, .. }));
        assert_eq!(sleeper.waits().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_tried_exactly_once() {
        let provider = ScriptedProvider::new(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
            Ok("from fallback".into()),
        ]);
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = caller(provider.clone(), sleeper.clone())
            .with_fallback_model(Some("gemini-2.0-flash".into()))
            .call("prompt", "gemini-2.5-flash", 3)
            .await
            .unwrap();

        assert_eq!(outcome.text, "from fallback");
        assert_eq!(outcome.model, "gemini-2.0-flash");
        assert!(outcome.used_fallback);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(sleeper.waits().len(), 2);
        assert_eq!(
            provider.models(),
            vec![
                "gemini-2.5-flash",
                "gemini-2.5-flash",
                "gemini-2.5-flash",
                "gemini-2.0-flash"
            ]
        );
    }

    #[tokio::test]
    async fn test_rate_limited_fallback_is_exhausted() {
        let provider = ScriptedProvider::new(vec![rate_limited(), rate_limited()]);
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = caller(provider.clone(), sleeper)
            .with_fallback_model(Some("gemini-2.0-flash".into()))
            .call("prompt", "gemini-2.5-flash", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ServiceExhausted { attempts: 2, .. }));
        assert_eq!(provider.models().len(), 2);
    }

    #[test]
    fn test_blank_fallback_disables_it() {
        let provider = ScriptedProvider::new(vec![]);
        let caller = ResilientCaller::new(provider, RetryPolicy::default())
            .with_fallback_model(Some("  ".into()));
        assert!(caller.fallback_model().is_none());
    }
}
