use ap_validator::cli::{self, commands, Args};
use ap_validator::core::{AppError, DefaultErrorReporter, ErrorReporter};
use ap_validator::logging::{self, LoggingConfig};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let code = match execute(args) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_error) => DefaultErrorReporter.report_error(app_error),
                None => eprintln!("[ERROR] {:#}", err),
            }
            commands::EXIT_FAILURE
        }
    };
    ExitCode::from(code.clamp(0, u8::MAX as i32) as u8)
}

fn execute(args: Args) -> ap_validator::Result<i32> {
    let config = commands::load_config(args.config.as_deref())?;
    let _logging = logging::init(&LoggingConfig::from_section(&config.logging)?)?;
    cli::run(args.command, &config)
}
