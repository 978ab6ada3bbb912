use crate::core::app_package::checks::CheckRegistry;
use crate::core::app_package::report::{BlockingFailure, ValidationReport};
use crate::core::app_package::structural::StructuralValidator;
use crate::core::app_package::AppPackage;

/// Options for a full validation run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub entry_point: Option<String>,
    /// `None` skips the structural validator.
    pub structural: Option<StructuralValidator>,
}

/// Runs every requirement check, the unsupported-construct scan and optionally the structural
/// validator, collecting everything into one report.
pub struct ValidationRunner {
    registry: CheckRegistry,
    options: RunOptions,
}

impl ValidationRunner {
    pub fn new(options: RunOptions) -> Self {
        Self {
            registry: CheckRegistry::new(),
            options,
        }
    }

    pub fn run(&self, source: &str, package: &AppPackage) -> ValidationReport {
        let entry_point = self.options.entry_point.as_deref();
        let mut report = ValidationReport::new(source, package, entry_point);

        for rule in self.registry.rules() {
            let issues = self.registry.run_rule(rule, package, entry_point);
            tracing::debug!(rule = %rule, issues = issues.len(), "requirement check finished");
            report.record_rule(rule, issues);
        }

        // Blocking, but recorded after the rules so their issues are still reported.
        let unsupported = package.scan_unsupported_constructs(entry_point);
        if !unsupported.is_empty() {
            let failure = BlockingFailure::unsupported(&unsupported);
            tracing::warn!(code = %failure.code, nodes = failure.nodes.len(), "{}", failure.message);
            report.record_failure(failure);
        }

        if let Some(validator) = &self.options.structural {
            match package.validate_structure(validator) {
                Ok(outcome) => report.record_structural(outcome),
                Err(err) => {
                    tracing::error!(code = %err.code, "{}", err.message);
                    report.record_blocking(&err);
                }
            }
        }

        tracing::info!(
            valid = report.is_valid(),
            issues = report.issues.len(),
            "validation finished"
        );
        report
    }
}
