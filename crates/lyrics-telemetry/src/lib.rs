//! # Lyrics Telemetry
//!
//! Log output for the lyrics bridge processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lyrics_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `lyrics-bridge` | Service name in startup logs |
//! | `LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LOG_JSON` | `false` (`true` in containers) | JSON log lines |
//! | `LOG_CONSOLE` | `true` | Write logs to stdout |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Install the global tracing subscriber described by `config`.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}
