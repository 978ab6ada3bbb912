use crate::core::app_package::report::ReportFormat;
use clap::Args;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Application Package to validate: URL, file:// URL, path, or `-` for stdin
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Workflow id scoping the checks (overrides checks.entry_point)
    #[arg(long, short = 'e', value_name = "NAME")]
    pub entry_point: Option<String>,

    /// Report format (overrides report.format)
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<ReportFormat>,

    /// Do not run the external structural validator
    #[arg(long)]
    pub skip_structural: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rule to run: req-7, req-8, req-9, req-10, req-11 or unsupported
    #[arg(value_name = "RULE")]
    pub rule: String,

    /// Application Package to check: URL, file:// URL, path, or `-` for stdin
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Workflow id scoping the check (overrides checks.entry_point)
    #[arg(long, short = 'e', value_name = "NAME")]
    pub entry_point: Option<String>,
}

#[derive(Args, Debug)]
pub struct StructureArgs {
    /// Application Package to hand to the structural validator
    #[arg(value_name = "SOURCE")]
    pub source: String,
}
