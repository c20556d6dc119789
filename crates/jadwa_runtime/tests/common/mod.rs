//! Shared fakes for pipeline tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jadwa_llms::{Error, GenerateRequest, GenerateResponse, Headers, Provider};
use jadwa_runtime::Sleeper;

/// Provider that replays scripted answers and records every request.
pub struct ScriptedProvider {
    answers: Mutex<VecDeque<jadwa_llms::Result<String>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(answers: Vec<jadwa_llms::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
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
        self.requests.lock().unwrap().push(request.clone());
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted answer left".into())));
        answer.map(|text| GenerateResponse {
            text,
            model: request.model,
            finish_reason: Some("STOP".into()),
            usage: None,
        })
    }
}

/// Records waits instead of sleeping.
#[derive(Default)]
pub struct NoSleep {
    pub waits: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl NoSleep {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[allow(dead_code)]
pub fn rate_limited() -> jadwa_llms::Result<String> {
    Err(Error::RateLimited {
        message: "Resource has been exhausted".into(),
        retry_after_secs: None,
    })
}
