//! Display trees backed by a generational arena.
//!
//! A [`TreeArena`] holds one rooted part of a chart as the forest builder
//! laid it out. Node handles are arena indices, so lookups stay O(1) and a
//! stale index can never alias a newer node.

use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;

/// One chart node as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: String,
    /// e.g. "Jane Doe - Engineer [42]"
    pub label: String,
    pub is_group: bool,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    pub parent: Option<Index>,
    /// In chart order
    pub children: Vec<Index>,
}

#[derive(Debug, Default)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `data` under `parent`; without a parent it becomes the root.
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(TreeNode {
            data,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(idx),
            None => self.root = Some(idx),
        }
        idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_data(&self) -> Option<&NodeData> {
        self.root.and_then(|idx| self.get_node(idx)).map(|n| &n.data)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, left to right.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            pending: self.root.into_iter().collect(),
        }
    }

    /// Index of the node displaying chart node `id`.
    pub fn find(&self, id: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.data.id == id)
            .map(|(idx, _)| idx)
    }

    /// Number of levels; a lone root has depth 1.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut pending = vec![(root, 1)];
        while let Some((idx, level)) = pending.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.get_node(idx) {
                pending.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        deepest
    }

    /// Ids of all nodes without children, left to right.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.id.clone())
            .collect()
    }

    /// Person boxes in this tree, department groups excluded.
    pub fn person_count(&self) -> usize {
        self.iter().filter(|(_, node)| !node.data.is_group).count()
    }

    pub fn to_termtree(&self) -> Tree<String> {
        fn render(tree: &TreeArena, idx: Index) -> Option<Tree<String>> {
            let node = tree.get_node(idx)?;
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|&child| render(tree, child))
                .collect();
            Some(Tree::new(node.data.label.clone()).with_leaves(leaves))
        }

        self.root
            .and_then(|root| render(self, root))
            .unwrap_or_else(|| Tree::new("(empty)".to_string()))
    }
}

pub struct PreOrder<'a> {
    tree: &'a TreeArena,
    pending: Vec<Index>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.pending.pop() {
            if let Some(node) = self.tree.get_node(idx) {
                self.pending.extend(node.children.iter().rev());
                return Some((idx, node));
            }
        }
        None
    }
}
