//! Tracing bootstrap shared by the service binary and the CLI.

use longbox_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the event filter, preferring `RUST_LOG` over the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_filter).map_err(|e| {
            anyhow::anyhow!("invalid log filter '{}': {}", settings.log_filter, e)
        }),
    }
}

/// Install the global subscriber.
///
/// Calling this twice is harmless: the second installation is skipped and
/// reported at `debug` level through the subscriber already in place.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;

    let installed = match settings.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init(),
    };

    if let Err(e) = installed {
        tracing::debug!(target: "longbox-telemetry", error = %e, "subscriber already installed");
    } else {
        tracing::info!(
            target: "longbox-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(())
}
