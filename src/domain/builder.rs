//! Forest builder: projects a node graph onto display trees.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::error::DomainError;
use crate::domain::graph::NodeGraph;
use crate::domain::node::Node;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Which link places a node in the display tree when it has both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkPreference {
    /// Under the direct manager; department boxes hang beside the reports.
    #[default]
    Manager,
    /// Inside the department box, which hangs under the manager.
    Group,
}

/// Constructs display trees from a node graph.
pub struct ForestBuilder {
    preference: LinkPreference,
    relationship_cache: HashMap<String, Vec<String>>,
    visited_ids: HashSet<String>,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new(LinkPreference::default())
    }
}

impl ForestBuilder {
    pub fn new(preference: LinkPreference) -> Self {
        Self {
            preference,
            relationship_cache: HashMap::new(),
            visited_ids: HashSet::new(),
        }
    }

    /// One tree per root, in graph order.
    ///
    /// Fails with `CycleDetected` when some node is unreachable from every
    /// root, which only happens for cyclic links.
    #[instrument(level = "debug", skip(self, graph), fields(nodes = graph.len()))]
    pub fn build(&mut self, graph: &NodeGraph) -> TreeResult<Vec<TreeArena>> {
        self.relationship_cache.clear();
        self.visited_ids.clear();

        let mut roots = Vec::new();
        for node in graph.nodes() {
            match self.display_parent(graph, node) {
                Some(parent) => self
                    .relationship_cache
                    .entry(parent.to_string())
                    .or_default()
                    .push(node.id.clone()),
                None => roots.push(node),
            }
        }

        let mut trees = Vec::new();
        for root in roots {
            trees.push(self.build_tree(graph, root)?);
        }

        if let Some(stray) = graph
            .nodes()
            .iter()
            .find(|n| !self.visited_ids.contains(&n.id))
        {
            return Err(DomainError::CycleDetected {
                node: stray.id.clone(),
                target: self
                    .display_parent(graph, stray)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        debug!("built {} trees", trees.len());
        Ok(trees)
    }

    fn display_parent<'g>(&self, graph: &'g NodeGraph, node: &'g Node) -> Option<&'g str> {
        let existing = |link: &'g Option<String>| {
            link.as_deref()
                .filter(|id| *id != node.id && graph.get(id).is_some())
        };
        match self.preference {
            LinkPreference::Manager => existing(&node.parent_id).or_else(|| existing(&node.group_id)),
            LinkPreference::Group => existing(&node.group_id).or_else(|| existing(&node.parent_id)),
        }
    }

    fn build_tree(&mut self, graph: &NodeGraph, root: &Node) -> TreeResult<TreeArena> {
        let mut tree = TreeArena::new();
        let mut stack = vec![(root.id.clone(), None)];

        while let Some((current_id, parent_idx)) = stack.pop() {
            if !self.visited_ids.insert(current_id.clone()) {
                return Err(DomainError::CycleDetected {
                    node: current_id,
                    target: root.id.clone(),
                });
            }

            let node = graph
                .get(&current_id)
                .ok_or_else(|| DomainError::NodeNotFound(current_id.clone()))?;
            let data = NodeData {
                id: node.id.clone(),
                label: node.label(),
                is_group: node.is_group(),
            };
            let current_idx = tree.insert_node(data, parent_idx);

            // Reverse push keeps children in chart order
            if let Some(children) = self.relationship_cache.get(&current_id) {
                for child in children.iter().rev() {
                    stack.push((child.clone(), Some(current_idx)));
                }
            }
        }

        Ok(tree)
    }
}
