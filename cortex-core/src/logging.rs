//! Logging configuration with rotation support
//!
//! # Example
//!
//! ```rust,no_run
//! use cortex_core::config::LoggingConfig;
//! use cortex_core::logging::init_logging;
//!
//! init_logging(&LoggingConfig::default()).unwrap();
//! ```

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};

/// Install the global tracing subscriber.
///
/// - stdout layer in the configured [`LogFormat`]
/// - daily-rotated file layer when `directory` is set
/// - `RUST_LOG` overrides `level`
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    // 1. Filter
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // 2. Stdout
    let stdout_layer = match config.format {
        LogFormat::Compact => fmt::layer().with_target(false).compact().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    // 3. File appender with rotation (daily)
    let file_layer = match &config.directory {
        Some(directory) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .build(directory)
                .map_err(|e| Error::Internal(format!("Failed to create log appender: {}", e)))?;
            Some(fmt::layer().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to init tracing: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().to_path_buf()),
            ..LoggingConfig::default()
        };

        // whichever call wins the global slot, the next must report an error
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
