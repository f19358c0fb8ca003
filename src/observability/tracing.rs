use tracing::Span;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::ConfigError(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(e.to_string()))
}

pub fn trace_episode(episode_id: &Uuid) -> Span {
    tracing::info_span!(
        "episode",
        episode_id = %episode_id,
    )
}

pub fn trace_step(step: usize, mark: f64) -> Span {
    tracing::debug_span!(
        "step",
        step,
        mark,
    )
}
