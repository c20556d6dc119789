//! Subscriber initialization: console logging plus optional OTLP export
//! (OpenTelemetry 0.31).

use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::config::{ConsoleTarget, ObservabilityConfig};
use crate::error::ObservabilityError;

/// Filter used when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_FILTER: &str = "warn";

// Store the tracer provider for proper shutdown
static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Install the global subscriber.
///
/// Fails with [`ObservabilityError::InitFailed`] when a subscriber is
/// already installed or the filter directive does not parse.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let env_filter = match config.log_level.as_deref() {
        Some(level) => tracing_subscriber::EnvFilter::try_new(level)
            .map_err(|e| ObservabilityError::Config(format!("invalid log filter {level:?}: {e}")))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
    };

    // Build resource using Resource::new() pattern (0.31 API)
    let mut attributes = vec![KeyValue::new("service.name", config.service_name.clone())];

    if let Some(version) = &config.service_version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }

    // Add custom resource attributes
    for (key, value) in &config.resource_attributes {
        attributes.push(KeyValue::new(key.clone(), value.clone()));
    }

    // Build resource using Resource::builder() pattern (0.31 API)
    // In 0.31, Resource constructors are private; ResourceBuilder is the public API
    let resource = Resource::builder().with_attributes(attributes).build();

    // Build layers first (build separately, then compose once to avoid type mismatch)
    let fmt_layer = config.enable_console.then(|| {
        let writer = match config.console_target {
            ConsoleTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
            ConsoleTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        };
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(writer)
    });

    // Build OTLP layer if endpoint is configured
    let otel_layer = if let Some(endpoint) = &config.otlp_endpoint {
        match build_otlp_tracer_provider(&config.service_name, endpoint, resource.clone()) {
            Ok((tracer, provider)) => {
                // Set as global provider BEFORE creating layer (important ordering)
                global::set_tracer_provider(provider.clone());

                // Store provider for shutdown
                let _ = TRACER_PROVIDER.set(provider);

                Some(OpenTelemetryLayer::new(tracer))
            }
            Err(e) => {
                // No subscriber yet; report directly.
                eprintln!("warning: OTLP export to {endpoint} disabled: {e}");
                None
            }
        }
    } else {
        None
    };
    let otlp_enabled = otel_layer.is_some();

    // Compose subscriber once (no mutation, avoids type mismatch)
    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    tracing::debug!(
        service.name = %config.service_name,
        otlp = otlp_enabled,
        "tracing initialized"
    );
    Ok(())
}

/// Tracer provider with a batched OTLP/gRPC span exporter.
fn build_otlp_tracer_provider(
    service_name: &str,
    endpoint: &str,
    resource: Resource,
) -> Result<(opentelemetry_sdk::trace::SdkTracer, SdkTracerProvider), ObservabilityError> {
    // Build the OTLP span exporter using 0.31 builder pattern
    // Pattern: SpanExporter::builder().with_tonic().with_endpoint().build()
    // Note: with_endpoint() requires String, not &str
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.to_string())
        .build()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    // Create SDK tracer provider with batch exporter
    // In 0.31, with_batch_exporter() takes only the exporter (runtime handled via rt-tokio feature)
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource)
        .build();

    // Get tracer from provider (0.31 API: provider.tracer() returns SdkTracer)
    // Note: tracer() requires 'static lifetime, so we pass owned String
    let tracer = provider.tracer(service_name.to_string());

    Ok((tracer, provider))
}

/// Flush and stop the tracer provider, if OTLP export was enabled.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        // In 0.31, shutdown() returns Result but errors are logged internally
        let _ = provider.shutdown();
        tracing::debug!("OpenTelemetry tracer provider shut down");
    } else {
        tracing::debug!("No OpenTelemetry tracer provider to shutdown");
    }
}

/// Initialize with default configuration from environment variables
pub fn init_from_env() -> Result<(), ObservabilityError> {
    let config = ObservabilityConfig::from_env();
    init(config)
}
