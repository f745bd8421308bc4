//! Live node graph and its atomic mutation primitives.
//!
//! Every mutating method either succeeds completely or returns an error
//! without having touched the graph.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{validate_id, AnnotationTable, Node, NodePatch, TableContent};
use crate::domain::wire::{ChartEntry, NodeRecord};

/// Sibling reorder direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// How a drop was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentOutcome {
    /// Dropped onto a person: `parent_id` now points at the target.
    Parented,
    /// Dropped into a department box: `group_id` set, `parent_id` cleared.
    Grouped,
}

/// Content update of an annotation table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePatch {
    pub headers: Option<Vec<String>>,
    pub rows: Option<Vec<Vec<String>>>,
}

/// Ordered hierarchy nodes plus the side collection of annotation tables.
/// Ids are unique across both collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    tables: Vec<AnnotationTable>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph, checking id uniqueness and the no-self-parent rule.
    pub fn from_parts(nodes: Vec<Node>, tables: Vec<AnnotationTable>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        for id in nodes
            .iter()
            .map(|n| n.id.as_str())
            .chain(tables.iter().map(|t| t.id.as_str()))
        {
            if !seen.insert(id) {
                return Err(DomainError::DuplicateId(id.to_string()));
            }
        }
        if let Some(node) = nodes
            .iter()
            .find(|n| n.parent_id.as_deref() == Some(n.id.as_str()))
        {
            return Err(DomainError::CycleDetected {
                node: node.id.clone(),
                target: node.id.clone(),
            });
        }
        Ok(Self { nodes, tables })
    }

    pub fn from_nodes(nodes: Vec<Node>) -> DomainResult<Self> {
        Self::from_parts(nodes, Vec::new())
    }

    /// Decode flat records, splitting annotation tables from hierarchy nodes.
    /// Records with a reserved id are skipped.
    pub fn from_records(records: Vec<NodeRecord>) -> DomainResult<Self> {
        let mut nodes = Vec::new();
        let mut tables = Vec::new();
        for record in records {
            if record.is_reserved() {
                debug!("skipping reserved record {}", record.id);
                continue;
            }
            match record.into_entry()? {
                ChartEntry::Node(node) => nodes.push(node),
                ChartEntry::Table(table) => tables.push(table),
            }
        }
        Self::from_parts(nodes, tables)
    }

    /// Flat form: hierarchy nodes in order, then tables.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.nodes
            .iter()
            .map(NodeRecord::from)
            .chain(self.tables.iter().map(NodeRecord::from))
            .collect()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn tables(&self) -> &[AnnotationTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.tables.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_table(&self, id: &str) -> Option<&AnnotationTable> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// True if any node or table uses `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some() || self.get_table(id).is_some()
    }

    fn position(&self, id: &str) -> DomainResult<usize> {
        match self.nodes.iter().position(|n| n.id == id) {
            Some(idx) => Ok(idx),
            None if self.get_table(id).is_some() => {
                Err(DomainError::NotHierarchical(id.to_string()))
            }
            None => Err(DomainError::NodeNotFound(id.to_string())),
        }
    }

    fn table_position(&self, id: &str) -> DomainResult<usize> {
        match self.tables.iter().position(|t| t.id == id) {
            Some(idx) => Ok(idx),
            None if self.get(id).is_some() => Err(DomainError::NotHierarchical(id.to_string())),
            None => Err(DomainError::NodeNotFound(id.to_string())),
        }
    }

    /// Nodes whose parent link is absent or dangling.
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| match &n.parent_id {
                None => true,
                Some(pid) => self.get(pid).is_none(),
            })
            .collect()
    }

    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(id))
            .collect()
    }

    pub fn members_of(&self, group_id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.group_id.as_deref() == Some(group_id))
            .collect()
    }

    /// Whether following parent and group links from `start` reaches `goal`.
    pub fn reaches(&self, start: &str, goal: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if current == goal {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.get(current) {
                queue.extend(node.parent_id.as_deref());
                queue.extend(node.group_id.as_deref());
            }
        }
        false
    }

    /// True if some node links to `id` without it being in the graph.
    pub fn is_referenced(&self, id: &str) -> bool {
        self.nodes
            .iter()
            .any(|n| n.parent_id.as_deref() == Some(id) || n.group_id.as_deref() == Some(id))
    }

    /// Whether naming `id` as `new_id` would link it back to itself.
    fn closes_cycle(&self, id: &str, new_id: &str) -> bool {
        self.nodes
            .iter()
            .filter(|n| {
                n.parent_id.as_deref() == Some(new_id) || n.group_id.as_deref() == Some(new_id)
            })
            .any(|n| self.reaches(id, &n.id))
    }

    // ============================================================
    // Hierarchy mutations
    // ============================================================

    #[instrument(level = "debug", skip(self, node), fields(id = %node.id))]
    pub fn insert_node(&mut self, node: Node) -> DomainResult<()> {
        validate_id(&node.id)?;
        if self.contains_id(&node.id) {
            return Err(DomainError::DuplicateId(node.id));
        }
        if node.parent_id.as_deref() == Some(node.id.as_str()) {
            return Err(DomainError::CycleDetected {
                node: node.id.clone(),
                target: node.id,
            });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Merge `patch` onto the node. A changed id is applied last and every
    /// link to the old id is rewritten.
    #[instrument(level = "debug", skip(self, patch))]
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> DomainResult<()> {
        patch.validate()?;
        let idx = self.position(id)?;
        let new_id = patch.id.as_deref().filter(|new_id| *new_id != id);
        if let Some(new_id) = new_id {
            if self.contains_id(new_id) {
                return Err(DomainError::DuplicateId(new_id.to_string()));
            }
            // Dangling links to `new_id` attach to the renamed node.
            if self.closes_cycle(id, new_id) {
                return Err(DomainError::CycleDetected {
                    node: id.to_string(),
                    target: new_id.to_string(),
                });
            }
        }

        patch.apply_fields(&mut self.nodes[idx]);

        if let Some(new_id) = new_id {
            self.nodes[idx].id = new_id.to_string();
            for node in &mut self.nodes {
                if node.parent_id.as_deref() == Some(id) {
                    node.parent_id = Some(new_id.to_string());
                }
                if node.group_id.as_deref() == Some(id) {
                    node.group_id = Some(new_id.to_string());
                }
            }
            debug!("renamed {} -> {}", id, new_id);
        }
        Ok(())
    }

    /// Delete a node or table. Children are not touched and become roots.
    /// Returns false when nothing had that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.nodes.len() + self.tables.len();
        self.nodes.retain(|n| n.id != id);
        self.tables.retain(|t| t.id != id);
        before != self.nodes.len() + self.tables.len()
    }

    /// Drop `node_id` onto `target_id`.
    ///
    /// Rejected when the target already descends from the node through
    /// parent or group links.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, node_id: &str, target_id: &str) -> DomainResult<ReparentOutcome> {
        if node_id == target_id {
            return Err(DomainError::CycleDetected {
                node: node_id.to_string(),
                target: target_id.to_string(),
            });
        }
        let idx = self.position(node_id)?;
        let target_idx = self.position(target_id)?;

        if self.reaches(target_id, node_id) {
            return Err(DomainError::CycleDetected {
                node: node_id.to_string(),
                target: target_id.to_string(),
            });
        }

        let into_group = self.nodes[target_idx].is_group();
        let node = &mut self.nodes[idx];
        if into_group {
            node.group_id = Some(target_id.to_string());
            node.parent_id = None;
            Ok(ReparentOutcome::Grouped)
        } else {
            node.parent_id = Some(target_id.to_string());
            node.group_id = None;
            Ok(ReparentOutcome::Parented)
        }
    }

    /// Swap the node with its neighbour among nodes sharing the same
    /// `(parent_id, group_id)`. Returns false at the boundary.
    pub fn move_sibling(&mut self, node_id: &str, direction: Direction) -> DomainResult<bool> {
        let idx = self.position(node_id)?;
        let key = (
            self.nodes[idx].parent_id.clone(),
            self.nodes[idx].group_id.clone(),
        );
        let siblings: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent_id == key.0 && n.group_id == key.1)
            .map(|(i, _)| i)
            .collect();

        let pos = siblings
            .iter()
            .position(|&i| i == idx)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_string()))?;
        let neighbour = match direction {
            Direction::Left => pos.checked_sub(1),
            Direction::Right => Some(pos + 1).filter(|&p| p < siblings.len()),
        };
        match neighbour {
            Some(p) => {
                self.nodes.swap(idx, siblings[p]);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ============================================================
    // Annotation tables
    // ============================================================

    pub fn insert_table(&mut self, table: AnnotationTable) -> DomainResult<()> {
        validate_id(&table.id)?;
        if self.contains_id(&table.id) {
            return Err(DomainError::DuplicateId(table.id));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn update_table(&mut self, id: &str, patch: &TablePatch) -> DomainResult<()> {
        let idx = self.table_position(id)?;
        if let Some(headers) = &patch.headers {
            if headers.is_empty() {
                return Err(DomainError::validation("headers", "a table needs at least one column"));
            }
        }
        let content: &mut TableContent = &mut self.tables[idx].content;
        if let Some(headers) = &patch.headers {
            content.headers = headers.clone();
        }
        if let Some(rows) = &patch.rows {
            content.rows = rows.clone();
        }
        Ok(())
    }

    pub fn move_table(&mut self, id: &str, x: f64, y: f64) -> DomainResult<()> {
        let idx = self.table_position(id)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(DomainError::validation("position", "must be finite"));
        }
        let geometry = &mut self.tables[idx].geometry;
        geometry.x = x;
        geometry.y = y;
        Ok(())
    }

    pub fn resize_table(&mut self, id: &str, w: f64, h: f64) -> DomainResult<()> {
        let idx = self.table_position(id)?;
        if !(w.is_finite() && h.is_finite()) || w < 0.0 || h < 0.0 {
            return Err(DomainError::validation(
                "size",
                format!("width and height must be non-negative, got {}x{}", w, h),
            ));
        }
        let geometry = &mut self.tables[idx].geometry;
        geometry.w = w;
        geometry.h = h;
        Ok(())
    }
}
