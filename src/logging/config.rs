use crate::core::config::LoggingSection;
use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::anyhow;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::filter::{Directive, LevelFilter};

const DEFAULT_LEVEL: &str = "info";

/// Resolved logging configuration after reading the `[logging]` table and env overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub default_level: String,
    pub enable_file: bool,
    pub console_output: ConsoleOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: DEFAULT_LEVEL.to_string(),
            enable_file: false,
            console_output: ConsoleOutput::default(),
        }
    }
}

impl LoggingConfig {
    /// Precedence: defaults, the `[logging]` table, then `AP_VALIDATOR_LOG_DIR`.
    pub fn from_section(section: &LoggingSection) -> Result<Self> {
        let mut config = LoggingConfig::default();
        if let Some(log_dir) = &section.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        if let Some(default_level) = &section.default_level {
            config.default_level = default_level.clone();
        }
        if let Some(enable_file) = section.enable_file {
            config.enable_file = enable_file;
        }
        if let Some(console_output) = &section.console_output {
            config.console_output = ConsoleOutput::from_str(console_output).map_err(|e| anyhow!(e))?;
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(log_dir) = env::var("AP_VALIDATOR_LOG_DIR") {
            if !log_dir.trim().is_empty() {
                self.log_dir = Some(PathBuf::from(log_dir));
                self.enable_file = true;
            }
        }
    }

    /// A bare level name (`info`, `debug`, ...) or a `target=level` directive.
    fn validate(&self) -> Result<()> {
        let level = self.default_level.trim();
        let valid = if level.contains('=') {
            Directive::from_str(level).is_ok()
        } else {
            LevelFilter::from_str(level).is_ok()
        };
        if !valid {
            return Err(anyhow!(
                "logging.default_level '{}' is not a level name or a target=level directive",
                self.default_level
            ));
        }
        Ok(())
    }
}
