use crate::error::ConfigError;
use crate::settings::{
    DEFAULT_INPUT_DIR, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_PATH,
    DEFAULT_TOLERANCE_PCT,
};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{DataSettings, LoggingSettings, Settings, ValidationSettings};

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix of environment variable overrides, e.g. `HAWK__VALIDATION__TOLERANCE_PCT`.
pub const ENV_PREFIX: &str = "HAWK";

/// Loads the application configuration from `config.toml`.
///
/// This function is the primary entry point for this crate. See [`load_config_from`].
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new(CONFIG_FILE))
}

/// Loads the configuration with layered sources: built-in defaults, then the file at
/// `path` if it exists, then `HAWK__`-prefixed environment variables.
///
/// The result is validated before it is returned.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("data.input_dir", DEFAULT_INPUT_DIR)?
        .set_default("data.output_path", DEFAULT_OUTPUT_PATH)?
        .set_default("validation.tolerance_pct", DEFAULT_TOLERANCE_PCT)?
        .set_default("logging.level", DEFAULT_LOG_LEVEL)?
        .set_default("logging.directory", DEFAULT_LOG_DIR)?
        .set_default("logging.file_logging", true)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
