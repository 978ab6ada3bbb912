#![allow(clippy::result_large_err)]

use crate::core::app_package::AppPackage;
use crate::core::config::StructuralConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::Serialize;
use std::fs;
use std::process::Command;
use std::time::Instant;

const DOCUMENT_FILE_NAME: &str = "app-package.cwl";

/// Exit code and captured output of the external validator, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl StructuralOutcome {
    pub fn is_valid(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs an external schema validator (cwltool by default) on a package.
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    program: String,
    args: Vec<String>,
}

impl StructuralValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &StructuralConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Serialize the package to a scratch directory and run the validator on it.
    ///
    /// The scratch directory is removed when this returns, whatever the outcome.
    pub fn validate(&self, package: &AppPackage) -> Result<StructuralOutcome, AppError> {
        let serialized = serde_yaml::to_string(package.document()).map_err(|err| {
            AppError::with_source(
                ErrorCategory::ValidatorError,
                format!("failed to serialize document for {}: {}", self.program, err),
                Box::new(err),
            )
            .with_code("AP-VALIDATOR-002")
        })?;

        let scratch = tempfile::Builder::new()
            .prefix("ap-validator-")
            .tempdir()?;
        let document_path = scratch.path().join(DOCUMENT_FILE_NAME);
        fs::write(&document_path, serialized)?;

        tracing::debug!(
            "running structural validator: {} {} {}",
            self.program,
            self.args.join(" "),
            document_path.display()
        );
        let start_time = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&document_path)
            .output()
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::ValidatorError,
                    format!("Failed to launch structural validator '{}': {}", self.program, e),
                )
                .with_code("AP-VALIDATOR-001")
                .with_suggestion("install cwltool or set structural.command in ap-validator.toml")
            })?;

        let outcome = StructuralOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::info!(
            exit_code = outcome.exit_code,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "structural validator finished"
        );
        Ok(outcome)
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::from_config(&StructuralConfig::default())
    }
}
