pub mod app_package;
pub mod config;
pub mod error;
pub mod types;

pub use app_package::AppPackage;
pub use config::{ConfigLoader, ConfigValidator, ValidatorConfig};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use types::*;
