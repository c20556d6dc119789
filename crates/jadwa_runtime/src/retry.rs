//! Retry with capped exponential backoff and jitter.
//!
//! The policy is a plain value; sleeping and jitter are injected so the loop
//! can be driven by a fake clock in tests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random amount added to every wait.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_max_jitter(mut self, jitter: Duration) -> Self {
        self.max_jitter = jitter;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// `min(base * 2^attempt, max_delay)`, without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Wait after failed attempt `attempt` (0-based). `jitter` is a sample in
    /// `[0, 1)` scaled to `max_jitter`.
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let jitter = if jitter.is_finite() { jitter.clamp(0.0, 1.0) } else { 0.0 };
        self.backoff(attempt) + self.max_jitter.mul_f64(jitter)
    }
}

/// Suspends the current task. Swapped for a recording fake in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Successful result of a retried operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
    pub slept: Duration,
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    Exhausted { last: E, attempts: u32, slept: Duration },
    /// A non-retryable error stopped the loop.
    Permanent { error: E, attempts: u32, slept: Duration },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Permanent { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Permanent { error, .. } => error,
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are spent. `op` receives the 0-based attempt number.
/// No wait follows the final attempt.
pub async fn retry_with_backoff<T, E, F, Fut, P, J>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut jitter: J,
    is_retryable: P,
    mut op: F,
) -> Result<Retried<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    J: FnMut() -> f64,
{
    let max = policy.attempts();
    let mut slept = Duration::ZERO;
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt + 1,
                    slept,
                })
            }
            Err(error) if !is_retryable(&error) => {
                return Err(RetryError::Permanent {
                    error,
                    attempts: attempt + 1,
                    slept,
                })
            }
            Err(last) if attempt + 1 >= max => {
                return Err(RetryError::Exhausted {
                    last,
                    attempts: attempt + 1,
                    slept,
                })
            }
            Err(_) => {
                let delay = policy.delay_for(attempt, jitter());
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = max,
                    delay_ms = delay.as_millis() as u64,
                    "retryable failure, backing off"
                );
                sleeper.sleep(delay).await;
                slept += delay;
                attempt += 1;
            }
        }
    }
}
