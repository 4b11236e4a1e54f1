//! Subscriber installation.
//!
//! Pretty output for development, JSON lines with span context when
//! `json_logs` is set. Dispatches log with consistent fields:
//! - `kind`: action kind (follow, post, ...)
//! - `correlation_id`: per-action key, carried by the `dispatch` span
//! - `tier`: managed_relay, meta_transaction, broadcast or chain
//! - `tx_id` / `tx_hash`: key of the queued optimistic entry
//! - `nonce`: signing nonce after the dispatch

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Result of [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    /// This call installed the global subscriber.
    Installed,
    /// A global subscriber was already set; nothing changed.
    AlreadyInstalled,
}

/// Install the global subscriber described by `config`.
///
/// Safe to call more than once: later calls leave the first subscriber in
/// place and return [`LoggingState::AlreadyInstalled`].
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingState, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let installed = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(config.with_target)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(config.with_target)
            .with_thread_ids(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    };

    if !installed {
        return Ok(LoggingState::AlreadyInstalled);
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Dispatch logging initialized"
    );
    Ok(LoggingState::Installed)
}
