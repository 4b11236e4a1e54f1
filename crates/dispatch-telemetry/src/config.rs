//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging configuration for dispatch services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to print span targets
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tx-dispatch".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DISPATCH_SERVICE_NAME`: Service name (default: tx-dispatch)
    /// - `DISPATCH_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `DISPATCH_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("DISPATCH_SERVICE_NAME")
                .unwrap_or_else(|_| "tx-dispatch".to_string()),

            log_level: env::var("DISPATCH_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("DISPATCH_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            with_target: true,
        }
    }

    /// Quiet configuration for test binaries.
    pub fn for_tests() -> Self {
        Self {
            service_name: "tx-dispatch-tests".to_string(),
            log_level: "warn".to_string(),
            json_logs: false,
            with_target: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
