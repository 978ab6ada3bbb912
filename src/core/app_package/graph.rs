use crate::core::app_package::schema::{local_name, ProcessNode, StepRun};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

/// Process graph: one node per top-level or inline process, one edge per resolvable `run`.
pub(crate) struct ProcessGraph<'a> {
    graph: DiGraph<&'a ProcessNode, ()>,
}

impl<'a> ProcessGraph<'a> {
    pub(crate) fn build(nodes: &'a [ProcessNode]) -> Self {
        let mut graph = DiGraph::new();
        let mut by_local_id: HashMap<&'a str, NodeIndex> = HashMap::new();
        let mut references: Vec<(NodeIndex, &'a str)> = Vec::new();

        for node in nodes {
            let index = add_process(&mut graph, node, &mut references);
            if let Some(local_id) = node.local_id() {
                by_local_id.entry(local_id).or_insert(index);
            }
        }

        for (from, reference) in references {
            // References to external files (e.g. `tool.cwl`) have no node to point at.
            if let Some(&to) = by_local_id.get(local_name(reference)) {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph }
    }

    /// Every CommandLineTool, top-level or inline, in document order.
    pub(crate) fn tools(&self) -> Vec<&'a ProcessNode> {
        self.graph
            .node_indices()
            .map(|index| self.graph[index])
            .filter(|node| node.is_command_line_tool())
            .collect()
    }

    /// CommandLineTools reachable from `entry` through step `run` targets, in document order.
    pub(crate) fn reachable_tools(&self, entry: &ProcessNode) -> Vec<&'a ProcessNode> {
        let Some(start) = self
            .graph
            .node_indices()
            .find(|&index| std::ptr::eq(self.graph[index], entry))
        else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(index) = bfs.next(&self.graph) {
            visited.insert(index);
        }

        self.graph
            .node_indices()
            .filter(|index| visited.contains(index))
            .map(|index| self.graph[index])
            .filter(|node| node.is_command_line_tool())
            .collect()
    }
}

fn add_process<'a>(
    graph: &mut DiGraph<&'a ProcessNode, ()>,
    node: &'a ProcessNode,
    references: &mut Vec<(NodeIndex, &'a str)>,
) -> NodeIndex {
    let index = graph.add_node(node);
    for step in &node.steps {
        match &step.run {
            Some(StepRun::Reference(reference)) => references.push((index, reference.as_str())),
            Some(StepRun::Inline(process)) => {
                let child = add_process(graph, process, references);
                graph.add_edge(index, child, ());
            }
            None => {}
        }
    }
    index
}
