use crate::core::app_package::{AppPackage, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod rules;
pub use rules::*;

/// Best-practice requirements checked by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "req-7")]
    Req7,
    #[serde(rename = "req-8")]
    Req8,
    #[serde(rename = "req-9")]
    Req9,
    #[serde(rename = "req-10")]
    Req10,
    #[serde(rename = "req-11")]
    Req11,
}

impl RuleId {
    pub const ALL: [RuleId; 5] = [
        RuleId::Req7,
        RuleId::Req8,
        RuleId::Req9,
        RuleId::Req10,
        RuleId::Req11,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Req7 => "req-7",
            RuleId::Req8 => "req-8",
            RuleId::Req9 => "req-9",
            RuleId::Req10 => "req-10",
            RuleId::Req11 => "req-11",
        }
    }

    /// Requirement wording from the best-practice profile.
    pub fn description(&self) -> &'static str {
        match self {
            RuleId::Req7 => {
                "The Application Package SHALL be a valid CWL document with a \"Workflow\" class \
                 and one or more \"CommandLineTool\" classes"
            }
            RuleId::Req8 => {
                "The Application Package CWL CommandLineTool classes SHALL contain the following \
                 elements: Identifier (\"id\"); Command line name (\"baseCommand\"); Input \
                 parameters (\"inputs\"); Environment requirements (\"requirements\"); Docker \
                 information (\"DockerRequirement\")"
            }
            RuleId::Req9 => {
                "The Application Package CWL Workflow class SHALL contain the following elements: \
                 Identifier (\"id\"); Title (\"label\"); Abstract (\"doc\")"
            }
            RuleId::Req10 => {
                "The Application Package CWL Workflow class \"inputs\" fields SHALL contain the \
                 following elements: Identifier (\"id\"); Title (\"label\"); Abstract (\"doc\")"
            }
            RuleId::Req11 => {
                "The Application Package CWL Workflow classes SHALL include additional metadata \
                 (\"author\", \"citation\", \"codeRepository\", \"contributor\", \"dateCreated\", \
                 \"keywords\", \"license\", \"releaseNotes\", \"version\")"
            }
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown rule '{}'; supported values are req-7, req-8, req-9, req-10, req-11",
                    value
                )
            })
    }
}

/// Issue severity. Only `Error` affects compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Hint,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "error"),
            IssueSeverity::Hint => write!(f, "hint"),
        }
    }
}

/// Finding emitted by a requirement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub rule: RuleId,
    pub severity: IssueSeverity,
    pub message: String,
}

impl Issue {
    pub fn error(rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    pub fn hint(rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: IssueSeverity::Hint,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.rule, self.message)
    }
}

/// Trait implemented by requirement checks.
///
/// Checks are pure: they read the package and return every violation they find.
pub trait RequirementCheck: Send + Sync {
    fn rule(&self) -> RuleId;
    fn check(&self, package: &AppPackage, selection: &Selection<'_>) -> Vec<Issue>;
}

/// Registry that runs the built-in requirement checks.
pub struct CheckRegistry {
    checks: Vec<Box<dyn RequirementCheck>>,
}

impl CheckRegistry {
    /// Construct a registry populated with the built-in checks.
    pub fn new() -> Self {
        Self {
            checks: built_in_checks(),
        }
    }

    pub fn rules(&self) -> Vec<RuleId> {
        self.checks.iter().map(|check| check.rule()).collect()
    }

    /// Run every check. Issues come out grouped in rule order.
    pub fn run(&self, package: &AppPackage, entry_point: Option<&str>) -> Vec<Issue> {
        let selection = package.select(entry_point);
        self.checks
            .iter()
            .flat_map(|check| check.check(package, &selection))
            .collect()
    }

    /// Run the checks registered for a single rule.
    pub fn run_rule(
        &self,
        rule: RuleId,
        package: &AppPackage,
        entry_point: Option<&str>,
    ) -> Vec<Issue> {
        let selection = package.select(entry_point);
        self.checks
            .iter()
            .filter(|check| check.rule() == rule)
            .flat_map(|check| check.check(package, &selection))
            .collect()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}
