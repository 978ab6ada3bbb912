use crate::core::app_package::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default config file name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "ap-validator.toml";

/// Main validator configuration loaded from ap-validator.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    /// External structural validator
    #[serde(default)]
    pub structural: StructuralConfig,

    /// Requirement check defaults
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Report rendering
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging section, consumed by the logging module
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Structural validator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralConfig {
    /// Run the structural validator as part of `validate`
    #[serde(default = "default_structural_enabled")]
    pub enabled: bool,

    /// Program to launch
    #[serde(default = "default_structural_command")]
    pub command: String,

    /// Arguments placed before the document path
    #[serde(default = "default_structural_args")]
    pub args: Vec<String>,
}

/// Requirement check configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChecksConfig {
    /// Workflow local id scoping the checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Raw `[logging]` table. Resolution and validation live in `crate::logging::config`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_output: Option<String>,
}

fn default_structural_enabled() -> bool {
    true
}

fn default_structural_command() -> String {
    "cwltool".to_string()
}

fn default_structural_args() -> Vec<String> {
    vec!["--validate".to_string()]
}

impl Default for StructuralConfig {
    fn default() -> Self {
        StructuralConfig {
            enabled: default_structural_enabled(),
            command: default_structural_command(),
            args: default_structural_args(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
