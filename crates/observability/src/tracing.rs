//! Span helpers shared by the jadwa crates

/// Span around one feasibility analysis.
///
/// ```rust
/// let span = jadwa_observability::analysis_span!("Cafe", "structured");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! analysis_span {
    ($project:expr, $mode:expr) => {
        tracing::info_span!(
            "jadwa.analysis",
            project = $project,
            mode = $mode,
            model = tracing::field::Empty,
            attempts = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around one model call, including its retries.
#[macro_export]
macro_rules! model_call_span {
    ($model:expr, $purpose:expr) => {
        tracing::info_span!(
            "jadwa.model_call",
            model = $model,
            purpose = $purpose,
            attempts = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around a lead log operation.
#[macro_export]
macro_rules! lead_log_span {
    ($operation:expr, $path:expr) => {
        tracing::debug_span!(
            "jadwa.lead_log",
            operation = $operation,
            path = $path,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span
///
/// Marks the span with `error = true` and the message, and emits an error
/// event.
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span
///
/// ```rust
/// use jadwa_observability::record_duration;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// record_duration("duration_ms", start.elapsed());
/// ```
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
