use crate::{
    cli::args::{CheckArgs, StructureArgs, ValidateArgs},
    core::{
        app_package::{
            checks::{CheckRegistry, RuleId},
            runner::{RunOptions, ValidationRunner},
            structural::StructuralValidator,
            AppPackage,
        },
        config::{ConfigLoader, ConfigValidator, ValidatorConfig},
        DefaultErrorReporter, ErrorReporter,
    },
    Result,
};
use anyhow::Context;
use std::env;
use std::io::{self, Read, Write};
use std::path::Path;

pub const EXIT_COMPLIANT: i32 = 0;
pub const EXIT_NOT_COMPLIANT: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

const STDIN_SOURCE: &str = "-";
const UNSUPPORTED_RULE: &str = "unsupported";

/// Load `--config FILE` or `./ap-validator.toml`, then env overrides, then validate.
pub fn load_config(explicit: Option<&Path>) -> Result<ValidatorConfig> {
    let cwd = env::current_dir().context("failed to resolve current directory")?;
    let config = ConfigLoader::load(explicit, &cwd)?;
    ConfigValidator::validate(&config)?;
    Ok(config)
}

/// Load a package from a location, or from stdin when the source is `-`.
fn load_package(source: &str) -> Result<AppPackage> {
    if source == STDIN_SOURCE {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read Application Package from stdin")?;
        tracing::debug!(bytes = text.len(), "read application package from stdin");
        return Ok(AppPackage::from_text(text)?);
    }
    Ok(AppPackage::from_location(source)?)
}

fn source_label(source: &str) -> &str {
    if source == STDIN_SOURCE {
        "<stdin>"
    } else {
        source
    }
}

fn resolve_entry_point<'a>(flag: &'a Option<String>, config: &'a ValidatorConfig) -> Option<&'a str> {
    flag.as_deref().or(config.checks.entry_point.as_deref())
}

pub fn validate(args: ValidateArgs, config: &ValidatorConfig) -> Result<i32> {
    tracing::info!("Validating Application Package {}", source_label(&args.source));
    let package = load_package(&args.source)?;

    let entry_point = resolve_entry_point(&args.entry_point, config).map(str::to_string);
    let structural = if args.skip_structural || !config.structural.enabled {
        tracing::debug!("structural validation skipped");
        None
    } else {
        Some(StructuralValidator::from_config(&config.structural))
    };
    let format = args.format.unwrap_or(config.report.format);

    let runner = ValidationRunner::new(RunOptions {
        entry_point,
        structural,
    });
    let report = runner.run(source_label(&args.source), &package);

    let rendered = report.render(format)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered.trim_end())?;

    Ok(if report.is_valid() {
        EXIT_COMPLIANT
    } else {
        EXIT_NOT_COMPLIANT
    })
}

pub fn check(args: CheckArgs, config: &ValidatorConfig) -> Result<i32> {
    let entry_point = resolve_entry_point(&args.entry_point, config);
    let mut stdout = io::stdout().lock();

    if args.rule.trim().eq_ignore_ascii_case(UNSUPPORTED_RULE) {
        let package = load_package(&args.source)?;
        return match package.check_unsupported_constructs(entry_point) {
            Ok(()) => {
                writeln!(stdout, "PASS unsupported")?;
                Ok(EXIT_COMPLIANT)
            }
            Err(err) => {
                writeln!(stdout, "FAIL unsupported")?;
                DefaultErrorReporter.report_error(&err);
                Ok(EXIT_NOT_COMPLIANT)
            }
        };
    }

    let rule: RuleId = args
        .rule
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}, unsupported", e))?;
    let package = load_package(&args.source)?;
    tracing::info!(rule = %rule, "running single rule");

    let issues = CheckRegistry::new().run_rule(rule, &package, entry_point);
    let failed = issues.iter().any(|issue| issue.is_error());
    writeln!(stdout, "{} {}", if failed { "FAIL" } else { "PASS" }, rule)?;
    for issue in &issues {
        writeln!(stdout, "  {}: {}", issue.severity, issue.message)?;
    }

    Ok(if failed {
        EXIT_NOT_COMPLIANT
    } else {
        EXIT_COMPLIANT
    })
}

pub fn structure(args: StructureArgs, config: &ValidatorConfig) -> Result<i32> {
    let package = load_package(&args.source)?;
    let validator = StructuralValidator::from_config(&config.structural);
    tracing::info!("Running structural validator {}", validator.program());

    let outcome = package.validate_structure(&validator)?;
    io::stdout().write_all(outcome.stdout.as_bytes())?;
    io::stderr().write_all(outcome.stderr.as_bytes())?;

    Ok(if outcome.is_valid() {
        EXIT_COMPLIANT
    } else {
        EXIT_NOT_COMPLIANT
    })
}
