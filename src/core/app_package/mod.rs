#![allow(clippy::result_large_err)]

//! Application Package document access and compliance checks.

pub mod checks;
pub mod fetch;
mod graph;
pub mod report;
pub mod runner;
pub mod schema;
pub mod structural;
pub mod unsupported;

use crate::core::error::AppError;
use checks::{CheckRegistry, Issue, RuleId};
use graph::ProcessGraph;
use schema::{parse_document, ProcessNode};
use serde_yaml::Value;
use structural::{StructuralOutcome, StructuralValidator};
use unsupported::UnsupportedConstruct;

/// A parsed CWL Application Package.
///
/// Immutable once built; every check borrows it and can be run any number of times.
#[derive(Debug, Clone)]
pub struct AppPackage {
    raw_text: String,
    document: Value,
    cwl_version: Option<String>,
    nodes: Vec<ProcessNode>,
    workflows: Vec<usize>,
    command_line_tools: Vec<usize>,
}

impl AppPackage {
    /// Build a package from CWL text (YAML or JSON).
    pub fn from_text(text: impl Into<String>) -> Result<Self, AppError> {
        let raw_text = text.into();
        let parsed = parse_document(&raw_text)?;

        let workflows = indices_where(&parsed.nodes, ProcessNode::is_workflow);
        let command_line_tools = indices_where(&parsed.nodes, ProcessNode::is_command_line_tool);
        tracing::debug!(
            nodes = parsed.nodes.len(),
            workflows = workflows.len(),
            command_line_tools = command_line_tools.len(),
            "parsed application package"
        );

        Ok(Self {
            raw_text,
            document: parsed.value,
            cwl_version: parsed.cwl_version,
            nodes: parsed.nodes,
            workflows,
            command_line_tools,
        })
    }

    /// Build a package from an http(s) URL, a `file://` URL or a local path.
    pub fn from_location(location: &str) -> Result<Self, AppError> {
        let text = fetch::fetch_document(location)?;
        Self::from_text(text).map(|package| {
            tracing::info!(location, "loaded application package");
            package
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn cwl_version(&self) -> Option<&str> {
        self.cwl_version.as_deref()
    }

    /// Top-level process nodes in document order.
    pub fn nodes(&self) -> &[ProcessNode] {
        &self.nodes
    }

    pub fn workflows(&self) -> impl Iterator<Item = &ProcessNode> {
        self.workflows.iter().map(|&index| &self.nodes[index])
    }

    pub fn command_line_tools(&self) -> impl Iterator<Item = &ProcessNode> {
        self.command_line_tools.iter().map(|&index| &self.nodes[index])
    }

    /// First Workflow whose local id equals `name`.
    pub fn find_workflow(&self, name: &str) -> Option<&ProcessNode> {
        self.workflows().find(|workflow| workflow.local_id() == Some(name))
    }

    /// Resolve the nodes the scoped checks look at.
    ///
    /// Without an entry point every Workflow is selected along with every CommandLineTool,
    /// including tools declared inline in a step's `run`.
    pub fn select(&self, entry_point: Option<&str>) -> Selection<'_> {
        let Some(entry_point) = entry_point else {
            return Selection {
                entry_point: None,
                selected_workflow: None,
                workflows: self.workflows().collect(),
                command_line_tools: ProcessGraph::build(&self.nodes).tools(),
            };
        };

        match self.find_workflow(entry_point) {
            Some(workflow) => Selection {
                entry_point: Some(entry_point.to_string()),
                selected_workflow: Some(workflow),
                workflows: vec![workflow],
                command_line_tools: ProcessGraph::build(&self.nodes).reachable_tools(workflow),
            },
            None => {
                tracing::warn!(entry_point, "entry point does not match any Workflow id");
                Selection {
                    entry_point: Some(entry_point.to_string()),
                    selected_workflow: None,
                    workflows: Vec::new(),
                    command_line_tools: Vec::new(),
                }
            }
        }
    }

    pub fn check_req_7(&self) -> Vec<Issue> {
        CheckRegistry::new().run_rule(RuleId::Req7, self, None)
    }

    pub fn check_req_8(&self, entry_point: Option<&str>) -> Vec<Issue> {
        CheckRegistry::new().run_rule(RuleId::Req8, self, entry_point)
    }

    pub fn check_req_9(&self, entry_point: Option<&str>) -> Vec<Issue> {
        CheckRegistry::new().run_rule(RuleId::Req9, self, entry_point)
    }

    pub fn check_req_10(&self, entry_point: Option<&str>) -> Vec<Issue> {
        CheckRegistry::new().run_rule(RuleId::Req10, self, entry_point)
    }

    pub fn check_req_11(&self, entry_point: Option<&str>) -> Vec<Issue> {
        CheckRegistry::new().run_rule(RuleId::Req11, self, entry_point)
    }

    /// Fails with an `UnsupportedConstruct` error naming every offending tool.
    pub fn check_unsupported_constructs(&self, entry_point: Option<&str>) -> Result<(), AppError> {
        unsupported::check(&self.select(entry_point))
    }

    pub fn scan_unsupported_constructs(&self, entry_point: Option<&str>) -> Vec<UnsupportedConstruct> {
        unsupported::scan(&self.select(entry_point))
    }

    pub fn validate_structure(
        &self,
        validator: &StructuralValidator,
    ) -> Result<StructuralOutcome, AppError> {
        validator.validate(self)
    }
}

fn indices_where(nodes: &[ProcessNode], predicate: impl Fn(&ProcessNode) -> bool) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| predicate(node))
        .map(|(index, _)| index)
        .collect()
}

/// Workflows and CommandLineTools in scope for one check run.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    entry_point: Option<String>,
    selected_workflow: Option<&'a ProcessNode>,
    workflows: Vec<&'a ProcessNode>,
    command_line_tools: Vec<&'a ProcessNode>,
}

impl<'a> Selection<'a> {
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// The requested entry point when it matched no Workflow.
    pub fn missing_entry_point(&self) -> Option<&str> {
        match self.selected_workflow {
            Some(_) => None,
            None => self.entry_point(),
        }
    }

    pub fn selected_workflow(&self) -> Option<&'a ProcessNode> {
        self.selected_workflow
    }

    pub fn workflows(&self) -> &[&'a ProcessNode] {
        &self.workflows
    }

    pub fn command_line_tools(&self) -> &[&'a ProcessNode] {
        &self.command_line_tools
    }
}
