use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR: &str = "exports";
pub const DEFAULT_OUTPUT_PATH: &str = "output/analysis.json";
pub const DEFAULT_TOLERANCE_PCT: f64 = 2.0;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataSettings,
    pub validation: ValidationSettings,
    pub logging: LoggingSettings,
}

/// Where the CSV exports are read from and where the analysis is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Allowed gap between a quarterly sum and its annual figure, in percent.
    /// 2 means 2%.
    pub tolerance_pct: Decimal,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            tolerance_pct: Decimal::TWO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Console filter directive, e.g. "info" or "validator=debug". `RUST_LOG` wins if set.
    pub level: String,
    /// Directory for `app.log` and `errors.log`.
    pub directory: PathBuf,
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file_logging: true,
        }
    }
}

impl Settings {
    /// Rejects settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.tolerance_pct.is_sign_negative() {
            return Err(ConfigError::ValidationError(format!(
                "validation.tolerance_pct must not be negative, got {}",
                self.validation.tolerance_pct
            )));
        }
        if self.data.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.input_dir must not be empty".to_string(),
            ));
        }
        if self.data.output_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.output_path must not be empty".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
