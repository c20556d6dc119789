//! Jadwa observability: tracing subscriber setup and span helpers
//!
//! Console logging goes to stderr by default so command output on stdout
//! stays machine-readable. OTLP export is enabled only when an endpoint is
//! configured.
//!
//! ```no_run
//! use jadwa_observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::from_env().with_log_level("jadwa_runtime=debug");
//! init(config)?;
//! tracing::info!("ready");
//! # Ok::<(), jadwa_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `JADWA_LOG` or `RUST_LOG` - Log filter
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint
//! - `OTEL_SERVICE_NAME` / `OTEL_SERVICE_VERSION` - Resource attributes

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::{ConsoleTarget, ObservabilityConfig};
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};
