//! Log subscriber setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,chroma_world=debug";

/// Which formatter the fmt layer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `CHROMA_LOG_FORMAT=json` selects JSON, anything else the human format
    pub fn from_env() -> Self {
        match std::env::var("CHROMA_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Install the global subscriber. Logs go to stderr; stdout carries frames.
pub fn init_telemetry(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?,
    }

    info!(log_format = ?format, "Telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_shows_engine_debug_events() {
        let subscriber = tracing_subscriber::registry().with(default_filter());

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "chroma_world::engine", Level::DEBUG));
            assert!(!tracing::enabled!(target: "chroma_world::engine", Level::TRACE));
            assert!(!tracing::enabled!(target: "tokio::runtime", Level::DEBUG));
            assert!(tracing::enabled!(target: "chroma_runner", Level::INFO));
        });
    }
}
