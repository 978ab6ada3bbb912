#![allow(clippy::result_large_err)]

//! Constructs the target execution engine cannot run.
//!
//! Unlike the requirement checks these are blocking: a document using them fails regardless of
//! how complete its metadata is, so [`check`] returns an error instead of issues.

use crate::core::app_package::checks::node_name;
use crate::core::app_package::Selection;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::Serialize;

pub const UNSUPPORTED_CODE: &str = "AP-UNSUPPORTED-001";

/// One offending construct on one CommandLineTool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedConstruct {
    pub node: String,
    pub construct: String,
    pub message: String,
}

/// Collect unsupported constructs on the CommandLineTools in scope.
pub fn scan(selection: &Selection<'_>) -> Vec<UnsupportedConstruct> {
    let mut found = Vec::new();
    for (index, tool) in selection.command_line_tools().iter().enumerate() {
        if tool
            .docker_requirements()
            .any(|docker| docker.has_output_directory())
        {
            let node = node_name(tool, index + 1);
            found.push(UnsupportedConstruct {
                message: format!(
                    "{}: Requirement 'dockerOutputDirectory' is not supported in DockerRequirement",
                    node
                ),
                construct: "dockerOutputDirectory".to_string(),
                node,
            });
        }
    }
    found
}

/// Fail when any tool in scope uses an unsupported construct.
///
/// The error names every offending node in its `nodes` context entry.
pub fn check(selection: &Selection<'_>) -> Result<(), AppError> {
    let found = scan(selection);
    if found.is_empty() {
        return Ok(());
    }
    Err(unsupported_error(&found))
}

pub fn unsupported_error(found: &[UnsupportedConstruct]) -> AppError {
    let nodes = found
        .iter()
        .map(|construct| construct.node.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    AppError::new(
        ErrorCategory::UnsupportedConstruct,
        "Requirement 'dockerOutputDirectory' is not supported in DockerRequirement",
    )
    .with_code(UNSUPPORTED_CODE)
    .with_context("nodes", nodes)
    .with_suggestion("remove dockerOutputDirectory and write outputs to the default working directory")
}
