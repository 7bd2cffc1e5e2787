use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`, which
/// in turn falls back to `info` when it is not a valid filter directive.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init multiblog logging: {e}"))?;

    tracing::debug!(default_level, "logging initialised");
    Ok(())
}
