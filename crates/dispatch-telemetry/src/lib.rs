//! # Dispatch Telemetry
//!
//! Structured logging for tiered transaction dispatch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dispatch_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("Failed to init logging");
//!     // Dispatch spans and events are now emitted
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DISPATCH_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `DISPATCH_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `DISPATCH_SERVICE_NAME` | `tx-dispatch` | Service name in the startup event |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingState};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log level directive did not parse.
    #[error("Invalid log filter: {0}")]
    Filter(String),
}
