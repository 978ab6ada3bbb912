#![allow(clippy::result_large_err)]

use super::{ValidatorConfig, CONFIG_FILE_NAME};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from an explicit file, or from `ap-validator.toml` in `dir`.
    /// An explicit file must exist; the directory default is optional.
    /// Environment variables override config file values.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<ValidatorConfig, AppError> {
        let config_file = match explicit {
            Some(path) => Some(Self::load_from_file(path)?.ok_or_else(|| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("Config file {} does not exist", path.display()),
                )
                .with_code("AP-CONFIG-001")
            })?),
            None => Self::load_from_file(&dir.join(CONFIG_FILE_NAME))?,
        };

        let mut config = config_file.unwrap_or_default();

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ValidatorConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ValidatorConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("AP-CONFIG-002")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(config: &mut ValidatorConfig) {
        if let Ok(enabled_str) = env::var("AP_VALIDATOR_STRUCTURAL_ENABLED") {
            if let Ok(enabled) = enabled_str.parse::<bool>() {
                config.structural.enabled = enabled;
            }
        }

        if let Ok(command) = env::var("AP_VALIDATOR_STRUCTURAL_COMMAND") {
            config.structural.command = command;
        }

        if let Ok(entry_point) = env::var("AP_VALIDATOR_ENTRY_POINT") {
            if !entry_point.trim().is_empty() {
                config.checks.entry_point = Some(entry_point);
            }
        }

        if let Ok(format_str) = env::var("AP_VALIDATOR_REPORT_FORMAT") {
            if let Ok(format) = format_str.parse() {
                config.report.format = format;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "AP_VALIDATOR_STRUCTURAL_ENABLED - Run the structural validator (true/false, default: true)",
            "AP_VALIDATOR_STRUCTURAL_COMMAND - Structural validator program (default: cwltool)",
            "AP_VALIDATOR_ENTRY_POINT - Workflow local id scoping the checks",
            "AP_VALIDATOR_REPORT_FORMAT - Report format (text/json, default: text)",
        ]
    }
}
