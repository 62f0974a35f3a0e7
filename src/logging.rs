use crate::config::LoggingConfig;
use crate::error::{HubError, Result};
use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "opportunity_hub.log";

/// Console output plus a JSON file per day under `config.dir`.
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    fs::create_dir_all(&config.dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| HubError::Config(format!("logging already initialized: {}", e)))?;

    // Flushing stops when the guard drops, so it lives for the whole process
    std::mem::forget(guard);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_configured_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            dir: dir.path().join("nested").join("logs").to_string_lossy().into_owned(),
            ..Default::default()
        };
        init_logging(&config).unwrap();
        assert!(dir.path().join("nested").join("logs").is_dir());

        // A second subscriber cannot be installed
        assert!(matches!(init_logging(&config), Err(HubError::Config(_))));
    }
}
