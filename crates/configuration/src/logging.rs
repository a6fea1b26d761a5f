//! Process-wide logging setup.
//!
//! Console output is filtered by `RUST_LOG` when set, otherwise by `logging.level`.
//! With file logging enabled, `app.log` receives everything down to DEBUG and
//! `errors.log` receives ERROR only. Both roll daily.

use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const APP_LOG_FILE: &str = "app.log";
pub const ERROR_LOG_FILE: &str = "errors.log";

/// Installs the global subscriber.
///
/// The returned guards flush the file writers when dropped, so the caller must keep them
/// alive until the program exits. Fails if a subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<Vec<WorkerGuard>, ConfigError> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            ConfigError::Logging(format!("invalid log level '{}': {e}", settings.level))
        })?;
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let mut guards = Vec::new();
    let file_layers = if settings.file_logging {
        std::fs::create_dir_all(&settings.directory).map_err(|e| {
            ConfigError::Logging(format!(
                "cannot create log directory {}: {e}",
                settings.directory.display()
            ))
        })?;

        let (app_writer, app_guard) = tracing_appender::non_blocking(
            tracing_appender::rolling::daily(&settings.directory, APP_LOG_FILE),
        );
        let (error_writer, error_guard) = tracing_appender::non_blocking(
            tracing_appender::rolling::daily(&settings.directory, ERROR_LOG_FILE),
        );
        guards.push(app_guard);
        guards.push(error_guard);

        let app_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(app_writer)
            .with_filter(LevelFilter::DEBUG);
        let error_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(error_writer)
            .with_filter(LevelFilter::ERROR);
        Some(app_layer.and_then(error_layer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layers)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::debug!(
        level = %settings.level,
        file_logging = settings.file_logging,
        "Logging initialized."
    );
    Ok(guards)
}
