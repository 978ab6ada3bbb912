#![allow(clippy::result_large_err)] // Parsing returns AppError to keep the failing node in the message.

//! Typed object graph for CWL documents.
//!
//! Only the parts of CWL the compliance rules look at are decoded; everything else stays in the
//! raw `serde_yaml::Value` owned by [`super::AppPackage`].

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

pub const GRAPH_KEY: &str = "$graph";
pub const NAMESPACES_KEY: &str = "$namespaces";
pub const DOCKER_REQUIREMENT: &str = "DockerRequirement";

/// Provenance fields whose absence is an error.
pub const REQUIRED_PROVENANCE: &[&str] = &["version"];

/// Provenance fields whose absence is only a hint.
pub const OPTIONAL_PROVENANCE: &[&str] = &[
    "author",
    "citation",
    "codeRepository",
    "contributor",
    "dateCreated",
    "keywords",
    "license",
    "releaseNotes",
];

/// Local name of a CWL identifier: the text after the first `#`, or the whole id.
pub fn local_name(id: &str) -> &str {
    match id.split_once('#') {
        Some((_, fragment)) => fragment,
        None => id,
    }
}

/// Short display name: the last `/` segment of the local name (`main/aoi` -> `aoi`).
pub fn short_name(id: &str) -> &str {
    let local = local_name(id);
    local.rsplit('/').next().unwrap_or(local)
}

/// CWL process classes accepted at the top of a document or inline in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessClass {
    Workflow,
    CommandLineTool,
    ExpressionTool,
    Operation,
}

impl ProcessClass {
    fn from_class(class: &str) -> Option<Self> {
        match class {
            "Workflow" => Some(ProcessClass::Workflow),
            "CommandLineTool" => Some(ProcessClass::CommandLineTool),
            "ExpressionTool" => Some(ProcessClass::ExpressionTool),
            "Operation" => Some(ProcessClass::Operation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessClass::Workflow => "Workflow",
            ProcessClass::CommandLineTool => "CommandLineTool",
            ProcessClass::ExpressionTool => "ExpressionTool",
            ProcessClass::Operation => "Operation",
        }
    }
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Workflow, CommandLineTool or other process node.
///
/// Attributes the rules test for presence are `Option`s: `None` means the key was absent (or
/// null) in the source document.
#[derive(Debug, Clone)]
pub struct ProcessNode {
    pub class: ProcessClass,
    pub id: Option<String>,
    pub label: Option<String>,
    pub doc: Option<String>,
    pub inputs: Option<Vec<InputParameter>>,
    pub requirements: Option<Vec<Requirement>>,
    pub hints: Option<Vec<Requirement>>,
    pub base_command: Option<Vec<String>>,
    pub steps: Vec<WorkflowStep>,
    pub provenance: Provenance,
}

impl ProcessNode {
    pub fn local_id(&self) -> Option<&str> {
        self.id.as_deref().map(local_name)
    }

    pub fn is_workflow(&self) -> bool {
        self.class == ProcessClass::Workflow
    }

    pub fn is_command_line_tool(&self) -> bool {
        self.class == ProcessClass::CommandLineTool
    }

    /// `requirements` followed by `hints`.
    pub fn effective_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .flatten()
            .chain(self.hints.iter().flatten())
    }

    pub fn docker_requirements(&self) -> impl Iterator<Item = &DockerRequirement> {
        self.effective_requirements()
            .filter_map(Requirement::as_docker)
    }

    /// First Docker requirement, looking at `requirements` before `hints`.
    pub fn docker_requirement(&self) -> Option<&DockerRequirement> {
        self.docker_requirements().next()
    }
}

/// Workflow or tool input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputParameter {
    pub id: Option<String>,
    pub label: Option<String>,
    pub doc: Option<String>,
}

/// Execution requirement or hint, dispatched on its `class`.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    Docker(DockerRequirement),
    Other { class: String, fields: Mapping },
}

impl Requirement {
    pub fn class(&self) -> &str {
        match self {
            Requirement::Docker(_) => DOCKER_REQUIREMENT,
            Requirement::Other { class, .. } => class,
        }
    }

    pub fn as_docker(&self) -> Option<&DockerRequirement> {
        match self {
            Requirement::Docker(docker) => Some(docker),
            Requirement::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerRequirement {
    #[serde(default)]
    pub docker_pull: Option<String>,
    #[serde(default)]
    pub docker_load: Option<String>,
    #[serde(default)]
    pub docker_file: Option<String>,
    #[serde(default)]
    pub docker_import: Option<String>,
    #[serde(default)]
    pub docker_image_id: Option<String>,
    #[serde(default)]
    pub docker_output_directory: Option<String>,
}

impl DockerRequirement {
    pub fn has_docker_pull(&self) -> bool {
        self.docker_pull
            .as_deref()
            .is_some_and(|pull| !pull.trim().is_empty())
    }

    pub fn has_output_directory(&self) -> bool {
        self.docker_output_directory
            .as_deref()
            .is_some_and(|dir| !dir.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub id: Option<String>,
    pub run: Option<StepRun>,
}

/// Target of a step's `run` field.
#[derive(Debug, Clone)]
pub enum StepRun {
    Reference(String),
    Inline(Box<ProcessNode>),
}

/// Provenance metadata resolved against `$namespaces`, keyed by bare field name.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    fields: IndexMap<String, Value>,
}

impl Provenance {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Output of [`parse_document`].
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub value: Value,
    pub cwl_version: Option<String>,
    pub namespaces: IndexMap<String, String>,
    pub nodes: Vec<ProcessNode>,
}

/// Parse CWL text (YAML or JSON) into its process nodes.
pub fn parse_document(text: &str) -> Result<ParsedDocument, AppError> {
    let value: Value = serde_yaml::from_str(text).map_err(|err| {
        AppError::with_source(
            ErrorCategory::ParseError,
            format!("document is not valid YAML: {}", err),
            Box::new(err),
        )
        .with_code("AP-PARSE-001")
    })?;

    let root = value
        .as_mapping()
        .ok_or_else(|| shape_error("document root must be a mapping"))?;

    let namespaces = parse_namespaces(root)?;
    let cwl_version = root
        .get("cwlVersion")
        .and_then(Value::as_str)
        .map(str::to_string);
    let prefixes: Vec<String> = namespaces.keys().cloned().collect();

    let nodes = match root.get(GRAPH_KEY) {
        Some(graph) => {
            let items = graph
                .as_sequence()
                .ok_or_else(|| shape_error("$graph must be a sequence of processes"))?;
            let ctx = ParseContext {
                prefixes: &prefixes,
                document_root: Some(root),
            };
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let map = item.as_mapping().ok_or_else(|| {
                        shape_error(format!("$graph item #{} must be a mapping", index + 1))
                    })?;
                    parse_process(map, &ctx, &format!("$graph item #{}", index + 1))
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let ctx = ParseContext {
                prefixes: &prefixes,
                document_root: None,
            };
            vec![parse_process(root, &ctx, "document root")?]
        }
    };

    Ok(ParsedDocument {
        value,
        cwl_version,
        namespaces,
        nodes,
    })
}

struct ParseContext<'a> {
    prefixes: &'a [String],
    /// Root of a packed document; provenance missing on a workflow falls back to it.
    document_root: Option<&'a Mapping>,
}

fn shape_error(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCategory::ParseError, message).with_code("AP-PARSE-002")
}

fn parse_namespaces(root: &Mapping) -> Result<IndexMap<String, String>, AppError> {
    let mut namespaces = IndexMap::new();
    let Some(value) = root.get(NAMESPACES_KEY) else {
        return Ok(namespaces);
    };
    let map = value
        .as_mapping()
        .ok_or_else(|| shape_error("$namespaces must be a mapping of prefix to URI"))?;
    for (prefix, uri) in map {
        let (Some(prefix), Some(uri)) = (prefix.as_str(), uri.as_str()) else {
            return Err(shape_error("$namespaces entries must be strings"));
        };
        namespaces.insert(prefix.to_string(), uri.to_string());
    }
    Ok(namespaces)
}

fn parse_process(map: &Mapping, ctx: &ParseContext<'_>, origin: &str) -> Result<ProcessNode, AppError> {
    let class_name = map.get("class").and_then(Value::as_str).ok_or_else(|| {
        AppError::new(
            ErrorCategory::ParseError,
            format!("{} has no 'class' field", origin),
        )
        .with_code("AP-PARSE-003")
    })?;
    let class = ProcessClass::from_class(class_name).ok_or_else(|| {
        AppError::new(
            ErrorCategory::ParseError,
            format!("{} has unknown class '{}'", origin, class_name),
        )
        .with_code("AP-PARSE-003")
    })?;

    let id = string_field(map, "id", origin)?;
    let name = match &id {
        Some(id) => format!("{} '{}'", class, local_name(id)),
        None => format!("{} ({})", class, origin),
    };

    let steps = match map.get("steps") {
        Some(steps) if class == ProcessClass::Workflow => parse_steps(steps, ctx, &name)?,
        _ => Vec::new(),
    };

    let provenance = if class == ProcessClass::Workflow {
        resolve_provenance(map, ctx)
    } else {
        Provenance::default()
    };

    Ok(ProcessNode {
        class,
        label: string_field(map, "label", &name)?,
        doc: doc_field(map, &name)?,
        inputs: parse_inputs(map.get("inputs"), &name)?,
        requirements: parse_requirements(map.get("requirements"), &name, "requirements")?,
        hints: parse_requirements(map.get("hints"), &name, "hints")?,
        base_command: parse_base_command(map.get("baseCommand"), &name)?,
        steps,
        provenance,
        id,
    })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(map: &Mapping, key: &str, owner: &str) -> Result<Option<String>, AppError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_string(value).map(Some).ok_or_else(|| {
            shape_error(format!("'{}' of {} must be a string", key, owner))
        }),
    }
}

/// `doc` may be a string or a list of strings.
fn doc_field(map: &Mapping, owner: &str) -> Result<Option<String>, AppError> {
    match map.get("doc") {
        Some(Value::Sequence(lines)) => {
            let lines = lines
                .iter()
                .map(|line| {
                    scalar_string(line).ok_or_else(|| {
                        shape_error(format!("'doc' of {} must contain only strings", owner))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(lines.join("\n")))
        }
        _ => string_field(map, "doc", owner),
    }
}

fn parse_inputs(value: Option<&Value>, owner: &str) -> Result<Option<Vec<InputParameter>>, AppError> {
    let inputs = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let map = item.as_mapping().ok_or_else(|| {
                    shape_error(format!("input #{} of {} must be a mapping", index + 1, owner))
                })?;
                let input_owner = format!("input #{} of {}", index + 1, owner);
                Ok(InputParameter {
                    id: string_field(map, "id", &input_owner)?,
                    label: string_field(map, "label", &input_owner)?,
                    doc: doc_field(map, &input_owner)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?,
        Some(Value::Mapping(map)) => map
            .iter()
            .map(|(key, item)| {
                let id = scalar_string(key)
                    .ok_or_else(|| shape_error(format!("input keys of {} must be strings", owner)))?;
                let input_owner = format!("input '{}' of {}", id, owner);
                // `name: type` shorthand carries no label or doc.
                let (label, doc) = match item.as_mapping() {
                    Some(fields) => (
                        string_field(fields, "label", &input_owner)?,
                        doc_field(fields, &input_owner)?,
                    ),
                    None => (None, None),
                };
                Ok(InputParameter {
                    id: Some(id),
                    label,
                    doc,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?,
        Some(_) => {
            return Err(shape_error(format!(
                "'inputs' of {} must be a sequence or a mapping",
                owner
            )))
        }
    };
    Ok(Some(inputs))
}

fn parse_requirements(
    value: Option<&Value>,
    owner: &str,
    key: &str,
) -> Result<Option<Vec<Requirement>>, AppError> {
    let entries: Vec<(String, Mapping)> = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let map = item.as_mapping().ok_or_else(|| {
                    shape_error(format!("{} #{} of {} must be a mapping", key, index + 1, owner))
                })?;
                let class = map.get("class").and_then(Value::as_str).ok_or_else(|| {
                    shape_error(format!("{} #{} of {} has no 'class'", key, index + 1, owner))
                })?;
                let fields: Mapping = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != Some("class"))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Ok((class.to_string(), fields))
            })
            .collect::<Result<Vec<_>, AppError>>()?,
        Some(Value::Mapping(map)) => map
            .iter()
            .map(|(class, fields)| {
                let class = class.as_str().ok_or_else(|| {
                    shape_error(format!("{} keys of {} must be class names", key, owner))
                })?;
                let fields = match fields {
                    Value::Mapping(fields) => fields.clone(),
                    Value::Null => Mapping::new(),
                    _ => {
                        return Err(shape_error(format!(
                            "{} '{}' of {} must be a mapping",
                            key, class, owner
                        )))
                    }
                };
                Ok((class.to_string(), fields))
            })
            .collect::<Result<Vec<_>, AppError>>()?,
        Some(_) => {
            return Err(shape_error(format!(
                "'{}' of {} must be a sequence or a mapping",
                key, owner
            )))
        }
    };

    entries
        .into_iter()
        .map(|(class, fields)| {
            if class == DOCKER_REQUIREMENT {
                let docker: DockerRequirement = serde_yaml::from_value(Value::Mapping(fields))
                    .map_err(|err| {
                        shape_error(format!("invalid {} in {} of {}: {}", DOCKER_REQUIREMENT, key, owner, err))
                    })?;
                Ok(Requirement::Docker(docker))
            } else {
                Ok(Requirement::Other { class, fields })
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn parse_base_command(value: Option<&Value>, owner: &str) -> Result<Option<Vec<String>>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(parts)) => parts
            .iter()
            .map(|part| {
                scalar_string(part).ok_or_else(|| {
                    shape_error(format!("'baseCommand' of {} must contain only strings", owner))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => scalar_string(other).map(|cmd| Some(vec![cmd])).ok_or_else(|| {
            shape_error(format!("'baseCommand' of {} must be a string or a list", owner))
        }),
    }
}

fn parse_steps(value: &Value, ctx: &ParseContext<'_>, owner: &str) -> Result<Vec<WorkflowStep>, AppError> {
    let inline_ctx = ParseContext {
        prefixes: ctx.prefixes,
        document_root: None,
    };
    let parse_step = |id: Option<String>, map: &Mapping| -> Result<WorkflowStep, AppError> {
        let step_owner = match &id {
            Some(id) => format!("step '{}' of {}", short_name(id), owner),
            None => format!("step of {}", owner),
        };
        let run = match map.get("run") {
            None | Some(Value::Null) => None,
            Some(Value::String(reference)) => Some(StepRun::Reference(reference.clone())),
            Some(Value::Mapping(process)) => Some(StepRun::Inline(Box::new(parse_process(
                process,
                &inline_ctx,
                &step_owner,
            )?))),
            Some(_) => {
                return Err(shape_error(format!(
                    "'run' of {} must be a reference or a process",
                    step_owner
                )))
            }
        };
        Ok(WorkflowStep { id, run })
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let map = item.as_mapping().ok_or_else(|| {
                    shape_error(format!("step #{} of {} must be a mapping", index + 1, owner))
                })?;
                parse_step(string_field(map, "id", owner)?, map)
            })
            .collect(),
        Value::Mapping(steps) => steps
            .iter()
            .map(|(id, item)| {
                let map = item.as_mapping().ok_or_else(|| {
                    shape_error(format!("steps of {} must be mappings", owner))
                })?;
                parse_step(scalar_string(id), map)
            })
            .collect(),
        _ => Err(shape_error(format!(
            "'steps' of {} must be a sequence or a mapping",
            owner
        ))),
    }
}

fn resolve_provenance(map: &Mapping, ctx: &ParseContext<'_>) -> Provenance {
    let mut fields = IndexMap::new();
    for &field in REQUIRED_PROVENANCE.iter().chain(OPTIONAL_PROVENANCE) {
        let found = lookup_provenance(map, field, ctx.prefixes).or_else(|| {
            ctx.document_root
                .and_then(|root| lookup_provenance(root, field, ctx.prefixes))
        });
        if let Some(value) = found {
            fields.insert(field.to_string(), value.clone());
        }
    }
    Provenance { fields }
}

fn lookup_provenance<'a>(map: &'a Mapping, field: &str, prefixes: &[String]) -> Option<&'a Value> {
    let mut names = vec![field];
    if field == "version" {
        names.push("softwareVersion");
    }
    names.into_iter().find_map(|name| {
        std::iter::once(name.to_string())
            .chain(prefixes.iter().map(|prefix| format!("{}:{}", prefix, name)))
            .find_map(|key| map.get(key.as_str()).filter(|value| !value.is_null()))
    })
}
