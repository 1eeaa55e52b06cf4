//! Subscriber installation.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{LogFormat, LoggingConfig, ObservabilityError};

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ObservabilityError::Config(format!("invalid log level: {e}")))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };
    installed.map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;

    tracing::info!(level = %config.level, format = ?config.format, "Initialized structured tracing");
    Ok(())
}
