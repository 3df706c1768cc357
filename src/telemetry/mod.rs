//! Structured logging for the universal verifier
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and either a compact
//! or a JSON formatter. Rejections that contradict a request or the attested
//! state, and those from unauthorized signers, are logged under the `audit`
//! target so they can be routed separately (e.g. `LOG_LEVEL=info,audit=warn`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,
    /// Enable console logging
    pub enable_console: bool,
    /// Enable JSON logging format
    pub json_format: bool,
    /// Log level filter
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "universal-verifier".to_string(),
            enable_console: true,
            json_format: false,
            log_level: "info".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            enable_console: lookup("LOG_CONSOLE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enable_console),
            json_format: lookup("LOG_JSON")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.json_format),
            log_level: lookup("LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::registry().with(config.env_filter());

    if !config.enable_console {
        subscriber.try_init()?;
    } else if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(fmt_layer).try_init()?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact();
        subscriber.with(fmt_layer).try_init()?;
    }

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );
    Ok(())
}

/// Span and event field keys for consistent instrumentation
pub mod attributes {
    pub const SUBJECT: &str = "subject";
    pub const REQUEST_ID: &str = "request_id";
    pub const VALIDATOR: &str = "validator";
    pub const CIRCUIT: &str = "circuit";
    pub const ERROR_KIND: &str = "kind";
}

/// Log target for audit-worthy rejections
pub const AUDIT_TARGET: &str = "audit";
