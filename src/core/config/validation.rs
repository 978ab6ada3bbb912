#![allow(clippy::result_large_err)]

use super::ValidatorConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ValidatorConfig) -> Result<(), AppError> {
        if config.structural.enabled && config.structural.command.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "structural.command cannot be empty when structural.enabled is true",
            )
            .with_code("AP-CONFIG-003"));
        }

        if let Some(entry_point) = &config.checks.entry_point {
            if entry_point.trim().is_empty() {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    "checks.entry_point cannot be blank",
                )
                .with_code("AP-CONFIG-004"));
            }
        }

        Ok(())
    }
}
