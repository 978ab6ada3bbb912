use crate::core::app_package::checks::{Issue, IssueSeverity, RuleId};
use crate::core::app_package::structural::StructuralOutcome;
use crate::core::app_package::unsupported::{unsupported_error, UnsupportedConstruct};
use crate::core::app_package::AppPackage;
use crate::core::error::AppError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary grouped by rule
    #[default]
    Text,
    /// JSON payload suitable for downstream tooling
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "invalid report format '{}'; supported values are text, json",
                value
            )),
        }
    }
}

/// Fatal failure captured while building a report: an unsupported construct, or a structural
/// validator that could not be launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingFailure {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
}

impl BlockingFailure {
    /// A single failure listing every node the scan flagged.
    pub fn unsupported(found: &[UnsupportedConstruct]) -> Self {
        let error = unsupported_error(found);
        Self {
            code: error.code,
            message: error.message,
            nodes: found.iter().map(|construct| construct.node.clone()).collect(),
        }
    }
}

impl From<&AppError> for BlockingFailure {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code.clone(),
            message: error.message.clone(),
            nodes: Vec::new(),
        }
    }
}

/// Aggregated result of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub source: String,
    pub entry_point: Option<String>,
    pub source_sha256: String,
    pub generated_at: DateTime<Utc>,
    pub rules: Vec<RuleId>,
    pub issues: Vec<Issue>,
    pub blocking: Vec<BlockingFailure>,
    pub structural: Option<StructuralOutcome>,
    pub valid: bool,
}

impl ValidationReport {
    pub fn new(source: impl Into<String>, package: &AppPackage, entry_point: Option<&str>) -> Self {
        Self {
            source: source.into(),
            entry_point: entry_point.map(str::to_string),
            source_sha256: sha256_hex(package.raw_text()),
            generated_at: Utc::now(),
            rules: Vec::new(),
            issues: Vec::new(),
            blocking: Vec::new(),
            structural: None,
            valid: true,
        }
    }

    /// Record the issues a rule produced. A rule with no issues is recorded as passed.
    pub fn record_rule(&mut self, rule: RuleId, issues: impl IntoIterator<Item = Issue>) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self.issues.extend(issues);
        self.refresh_validity();
    }

    pub fn record_blocking(&mut self, error: &AppError) {
        self.record_failure(BlockingFailure::from(error));
    }

    pub fn record_failure(&mut self, failure: BlockingFailure) {
        self.blocking.push(failure);
        self.refresh_validity();
    }

    pub fn record_structural(&mut self, outcome: StructuralOutcome) {
        self.structural = Some(outcome);
        self.refresh_validity();
    }

    fn refresh_validity(&mut self) {
        self.valid = !self.issues.iter().any(Issue::is_error)
            && self.blocking.is_empty()
            && self.structural.as_ref().map_or(true, StructuralOutcome::is_valid);
    }

    /// No error issue, no blocking failure, and a clean structural run when one was made.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn issues_for_rule(&self, rule: RuleId) -> Vec<&Issue> {
        self.issues.iter().filter(|issue| issue.rule == rule).collect()
    }

    pub fn issues_with_severity(&self, severity: IssueSeverity) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .collect()
    }

    /// Issues keyed by rule, in the order rules were recorded. Passing rules map to an empty list.
    pub fn grouped_by_rule(&self) -> IndexMap<RuleId, Vec<&Issue>> {
        let mut grouped: IndexMap<RuleId, Vec<&Issue>> =
            self.rules.iter().map(|rule| (*rule, Vec::new())).collect();
        for issue in &self.issues {
            grouped.entry(issue.rule).or_default().push(issue);
        }
        grouped
    }

    pub fn rule_passed(&self, rule: RuleId) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.rule == rule && issue.is_error())
    }

    pub fn render(&self, format: ReportFormat) -> crate::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Text rendering. Structural validator output is reproduced verbatim.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Application Package validation report");
        let _ = writeln!(out, "Source: {}", self.source);
        let _ = writeln!(
            out,
            "Entry point: {}",
            self.entry_point.as_deref().unwrap_or("(all workflows)")
        );
        let _ = writeln!(out, "SHA-256: {}", self.source_sha256);
        out.push('\n');

        match &self.structural {
            Some(outcome) => {
                let verdict = if outcome.is_valid() { "passed" } else { "failed" };
                let _ = writeln!(
                    out,
                    "Structural validation: {} (exit code {})",
                    verdict, outcome.exit_code
                );
                for (stream, text) in [("stdout", &outcome.stdout), ("stderr", &outcome.stderr)] {
                    if !text.trim().is_empty() {
                        let _ = writeln!(out, "--- {} ---", stream);
                        out.push_str(text);
                        if !text.ends_with('\n') {
                            out.push('\n');
                        }
                    }
                }
            }
            None => {
                let _ = writeln!(out, "Structural validation: skipped");
            }
        }
        out.push('\n');

        for (rule, issues) in self.grouped_by_rule() {
            let verdict = if self.rule_passed(rule) { "PASS" } else { "FAIL" };
            let _ = writeln!(out, "{} {}", verdict, rule);
            for issue in issues {
                let _ = writeln!(out, "  {}: {}", issue.severity, issue.message);
            }
        }

        if !self.blocking.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "Blocking failures:");
            for failure in &self.blocking {
                let _ = writeln!(out, "  [{}] {}", failure.code, failure.message);
                for node in &failure.nodes {
                    let _ = writeln!(out, "    - {}", node);
                }
            }
        }

        out.push('\n');
        let verdict = if self.is_valid() {
            "COMPLIANT"
        } else {
            "NOT COMPLIANT"
        };
        let _ = writeln!(out, "Result: {}", verdict);
        out
    }
}

pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
