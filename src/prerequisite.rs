//! Feat prerequisite graph.
//!
//! Feats depend on other feats either explicitly (a named prerequisite in
//! the catalog) or implicitly (level N of a leveled feat needs level N-1).
//! This module keeps those links in a directed graph so a catalog can be
//! checked for loops and the full chain behind a feat can be listed in the
//! order it has to be taken.

use crate::catalog::{FeatDefinition, Requirement};
use crate::error::SheetError;
use crate::feat::{FeatLedger, LeveledName};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Directed graph of feat prerequisites, keyed by case-insensitive name.
///
/// Edges run from a prerequisite to the feat that needs it, so a
/// topological order lists prerequisites first.
///
/// # Examples
///
/// ```rust
/// use charsheet::prerequisite::PrerequisiteGraph;
///
/// let mut graph = PrerequisiteGraph::new();
/// graph.add_edge("Cleave", "Power Attack");
/// graph.add_edge("Great Cleave", "Cleave");
///
/// let chain = graph.required_chain("Great Cleave").unwrap();
/// assert_eq!(chain, vec!["Power Attack".to_string(), "Cleave".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl PrerequisiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from catalog definitions.
    ///
    /// A level-2 feat hangs off "<base> I" when the catalog has it, and off
    /// the bare base name otherwise.
    pub fn from_definitions<'a>(definitions: impl IntoIterator<Item = &'a FeatDefinition>) -> Self {
        let definitions: Vec<&FeatDefinition> = definitions.into_iter().collect();
        let mut graph = PrerequisiteGraph::new();
        for definition in &definitions {
            graph.add_node(&definition.name);
        }

        for definition in &definitions {
            for requirement in &definition.requirements {
                if let Requirement::Feat(name) = requirement {
                    graph.add_edge(&definition.name, name);
                }
            }

            let leveled = LeveledName::parse(&definition.name);
            if let Some(below) = leveled.prerequisite() {
                let numbered = format!("{} I", leveled.base);
                let below = if leveled.level == 2 && graph.contains(&numbered) {
                    numbered
                } else {
                    below
                };
                graph.add_edge(&definition.name, &below);
            }
        }

        tracing::debug!(
            feats = graph.graph.node_count(),
            links = graph.graph.edge_count(),
            "prerequisite graph built"
        );
        graph
    }

    /// Add a feat if it is not present yet, returning its node index.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        let key = key(name);
        if let Some(&idx) = self.node_map.get(&key) {
            idx
        } else {
            let idx = self.graph.add_node(name.trim().to_string());
            self.node_map.insert(key, idx);
            idx
        }
    }

    /// Record that `feat` requires `requires`.
    pub fn add_edge(&mut self, feat: &str, requires: &str) {
        let feat_idx = self.add_node(feat);
        let requires_idx = self.add_node(requires);
        if self.graph.find_edge(requires_idx, feat_idx).is_none() {
            self.graph.add_edge(requires_idx, feat_idx, ());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(&key(name))
    }

    /// Fail with the offending path if any prerequisites loop.
    pub fn detect_cycles(&self) -> Result<(), SheetError> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();

        for node in self.graph.node_indices() {
            if !visited.contains(&node) {
                let mut path = Vec::new();
                if let Some(cycle) = self.find_cycle(node, &mut visited, &mut on_stack, &mut path) {
                    return Err(cycle);
                }
            }
        }
        Ok(())
    }

    fn find_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<SheetError> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&next) {
                if let Some(cycle) = self.find_cycle(next, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(&next) {
                let start = path.iter().position(|idx| *idx == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|idx| self.graph[*idx].clone())
                    .collect();
                cycle.push(self.graph[next].clone());
                return Some(SheetError::PrerequisiteCycle { path: cycle });
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }

    /// Every feat, prerequisites first.
    pub fn topological_sort(&self) -> Result<Vec<String>, SheetError> {
        self.detect_cycles()?;
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|idx| self.graph[idx].clone()).collect())
            .map_err(|cycle| SheetError::PrerequisiteCycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    /// Every feat `target` transitively requires, in the order they must be
    /// taken. The target itself is not included; unknown targets have an
    /// empty chain.
    pub fn required_chain(&self, target: &str) -> Result<Vec<String>, SheetError> {
        let Some(&target_idx) = self.node_map.get(&key(target)) else {
            return Ok(Vec::new());
        };

        let mut needed = HashSet::new();
        let mut stack = vec![target_idx];
        while let Some(idx) = stack.pop() {
            for requires in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if needed.insert(requires) {
                    stack.push(requires);
                }
            }
        }
        if needed.contains(&target_idx) {
            self.detect_cycles()?;
        }

        let order = toposort(&self.graph, None).map_err(|cycle| SheetError::PrerequisiteCycle {
            path: vec![self.graph[cycle.node_id()].clone()],
        })?;
        Ok(order
            .into_iter()
            .filter(|idx| needed.contains(idx))
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    /// The part of `target`'s chain that `ledger` does not already satisfy.
    pub fn missing_for(&self, target: &str, ledger: &FeatLedger) -> Result<Vec<String>, SheetError> {
        Ok(self
            .required_chain(target)?
            .into_iter()
            .filter(|name| !ledger.satisfies(name))
            .collect())
    }
}
