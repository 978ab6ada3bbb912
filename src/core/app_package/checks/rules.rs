use super::{Issue, RequirementCheck, RuleId};
use crate::core::app_package::schema::{
    short_name, ProcessNode, DOCKER_REQUIREMENT, OPTIONAL_PROVENANCE, REQUIRED_PROVENANCE,
};
use crate::core::app_package::{AppPackage, Selection};

pub fn built_in_checks() -> Vec<Box<dyn RequirementCheck>> {
    vec![
        Box::new(DocumentClassesCheck),
        Box::new(CommandLineToolElementsCheck),
        Box::new(WorkflowElementsCheck),
        Box::new(WorkflowInputElementsCheck),
        Box::new(WorkflowMetadataCheck),
    ]
}

/// Display name of a node: `Workflow 'main'`, or `Workflow #2` when the id is missing.
pub fn node_name(node: &ProcessNode, position: usize) -> String {
    match node.local_id().filter(|id| !id.is_empty()) {
        Some(id) => format!("{} '{}'", node.class, id),
        None => format!("{} #{}", node.class, position),
    }
}

fn missing_element(rule: RuleId, owner: &str, element: &str) -> Issue {
    Issue::error(rule, format!("Missing element for {}: {}", owner, element))
}

/// Issue reported by scoped checks when the requested entry point matches no Workflow.
fn entry_point_not_found(rule: RuleId, selection: &Selection<'_>) -> Option<Issue> {
    selection.missing_entry_point().map(|entry_point| {
        Issue::error(
            rule,
            format!(
                "Entry point '{}' does not match any Workflow id",
                entry_point
            ),
        )
    })
}

/// req-7: at least one Workflow and one CommandLineTool.
pub struct DocumentClassesCheck;

impl RequirementCheck for DocumentClassesCheck {
    fn rule(&self) -> RuleId {
        RuleId::Req7
    }

    fn check(&self, package: &AppPackage, _selection: &Selection<'_>) -> Vec<Issue> {
        let mut out = Vec::new();
        if package.workflows().next().is_none() {
            out.push(Issue::error(RuleId::Req7, "No Workflow class defined"));
        }
        if package.command_line_tools().next().is_none() {
            out.push(Issue::error(RuleId::Req7, "No CommandLineTool class defined"));
        }
        out
    }
}

/// req-8: CommandLineTool id, baseCommand, inputs, requirements and a Docker image.
pub struct CommandLineToolElementsCheck;

impl RequirementCheck for CommandLineToolElementsCheck {
    fn rule(&self) -> RuleId {
        RuleId::Req8
    }

    fn check(&self, _package: &AppPackage, selection: &Selection<'_>) -> Vec<Issue> {
        if let Some(issue) = entry_point_not_found(RuleId::Req8, selection) {
            return vec![issue];
        }

        let mut out = Vec::new();
        for (index, tool) in selection.command_line_tools().iter().enumerate() {
            let name = node_name(tool, index + 1);
            if tool.local_id().filter(|id| !id.is_empty()).is_none() {
                out.push(missing_element(RuleId::Req8, &name, "id"));
            }
            if tool.base_command.is_none() {
                out.push(missing_element(RuleId::Req8, &name, "baseCommand"));
            }
            if tool.inputs.is_none() {
                out.push(missing_element(RuleId::Req8, &name, "inputs"));
            }
            if tool.requirements.is_none() {
                out.push(missing_element(RuleId::Req8, &name, "requirements"));
            }

            let has_image = tool
                .docker_requirement()
                .is_some_and(|docker| docker.has_docker_pull());
            if !has_image {
                out.push(missing_element(
                    RuleId::Req8,
                    &name,
                    &format!(
                        "requirements.{0}.dockerPull or hints.{0}.dockerPull",
                        DOCKER_REQUIREMENT
                    ),
                ));
            }
        }
        out
    }
}

/// req-9: Workflow id, label and doc.
pub struct WorkflowElementsCheck;

impl RequirementCheck for WorkflowElementsCheck {
    fn rule(&self) -> RuleId {
        RuleId::Req9
    }

    fn check(&self, _package: &AppPackage, selection: &Selection<'_>) -> Vec<Issue> {
        if let Some(issue) = entry_point_not_found(RuleId::Req9, selection) {
            return vec![issue];
        }

        let mut out = Vec::new();
        for (index, workflow) in selection.workflows().iter().enumerate() {
            let name = node_name(workflow, index + 1);
            if workflow.local_id().filter(|id| !id.is_empty()).is_none() {
                out.push(missing_element(RuleId::Req9, &name, "id"));
            }
            if workflow.label.is_none() {
                out.push(missing_element(RuleId::Req9, &name, "label"));
            }
            if workflow.doc.is_none() {
                out.push(missing_element(RuleId::Req9, &name, "doc"));
            }
        }
        out
    }
}

/// req-10: id, label and doc on every Workflow input.
pub struct WorkflowInputElementsCheck;

impl RequirementCheck for WorkflowInputElementsCheck {
    fn rule(&self) -> RuleId {
        RuleId::Req10
    }

    fn check(&self, _package: &AppPackage, selection: &Selection<'_>) -> Vec<Issue> {
        if let Some(issue) = entry_point_not_found(RuleId::Req10, selection) {
            return vec![issue];
        }

        let mut out = Vec::new();
        for (index, workflow) in selection.workflows().iter().enumerate() {
            let workflow_name = node_name(workflow, index + 1);
            for (input_index, input) in workflow.inputs.iter().flatten().enumerate() {
                let input_name = match input.id.as_deref().map(short_name) {
                    Some(id) if !id.is_empty() => format!("input '{}'", id),
                    _ => {
                        let name = format!("input #{}", input_index + 1);
                        out.push(missing_element(
                            RuleId::Req10,
                            &format!("{} of {}", name, workflow_name),
                            "id",
                        ));
                        name
                    }
                };
                let owner = format!("{} of {}", input_name, workflow_name);
                if input.label.is_none() {
                    out.push(missing_element(RuleId::Req10, &owner, "label"));
                }
                if input.doc.is_none() {
                    out.push(missing_element(RuleId::Req10, &owner, "doc"));
                }
            }
        }
        out
    }
}

/// req-11: version is mandatory, the remaining provenance metadata is recommended.
pub struct WorkflowMetadataCheck;

impl RequirementCheck for WorkflowMetadataCheck {
    fn rule(&self) -> RuleId {
        RuleId::Req11
    }

    fn check(&self, _package: &AppPackage, selection: &Selection<'_>) -> Vec<Issue> {
        if let Some(issue) = entry_point_not_found(RuleId::Req11, selection) {
            return vec![issue];
        }

        let mut out = Vec::new();
        for (index, workflow) in selection.workflows().iter().enumerate() {
            let name = node_name(workflow, index + 1);
            for field in REQUIRED_PROVENANCE {
                if !workflow.provenance.contains(field) {
                    out.push(missing_element(RuleId::Req11, &name, field));
                }
            }
            for field in OPTIONAL_PROVENANCE {
                if !workflow.provenance.contains(field) {
                    out.push(Issue::hint(
                        RuleId::Req11,
                        format!("Missing optional element for {}: {}", name, field),
                    ));
                }
            }
        }
        out
    }
}
