//! Chart editing session
//!
//! Holds one live node graph loaded from a chart document, applies atomic
//! edits to it and tracks whether there is unsaved work.
//!
//! State machine:
//! - `Unloaded` --load--> `Clean`
//! - `Clean` --edit--> `Dirty`
//! - `Dirty` --save ok--> `Clean`; a failed save stays `Dirty`
//! - any --load--> `Clean`, discarding the previous graph

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::error_ext::StoreResultExt;
use crate::application::hash::content_hash;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::node::TABLE_ID_PREFIX;
use crate::domain::{
    AnnotationTable, ChartData, Direction, DomainError, Node, NodeGraph, NodePatch, ReparentOutcome,
    TablePatch, TemplateKind,
};
use crate::infrastructure::traits::ChartStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Clean,
    Dirty,
}

/// What a successful save wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub chart_id: String,
    pub node_count: usize,
    pub table_count: usize,
    /// Hex SHA-256 of the serialized payload
    pub fingerprint: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveReceipt),
    /// The session was clean; nothing was written.
    Unchanged,
}

struct LoadedChart {
    chart_id: String,
    graph: NodeGraph,
}

/// Editing session for one chart document at a time.
pub struct ChartSession {
    store: Arc<dyn ChartStore>,
    loaded: Option<LoadedChart>,
    dirty: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl ChartSession {
    pub fn new(store: Arc<dyn ChartStore>) -> Self {
        Self {
            store,
            loaded: None,
            dirty: false,
            last_saved_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.loaded, self.dirty) {
            (None, _) => SessionState::Unloaded,
            (Some(_), false) => SessionState::Clean,
            (Some(_), true) => SessionState::Dirty,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state() == SessionState::Dirty
    }

    pub fn chart_id(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.chart_id.as_str())
    }

    pub fn graph(&self) -> ApplicationResult<&NodeGraph> {
        self.loaded
            .as_ref()
            .map(|l| &l.graph)
            .ok_or(ApplicationError::NoChartLoaded)
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Load a chart document from the store.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self, chart_id: &str) -> ApplicationResult<()> {
        let chart = self
            .store
            .get_chart(chart_id)
            .with_context("load chart")?
            .ok_or_else(|| ApplicationError::ChartNotFound(chart_id.to_string()))?;
        let graph = NodeGraph::from_records(chart.data.nodes)?;
        self.load_graph(chart_id, graph);
        Ok(())
    }

    /// Replace whatever was loaded with `graph`; the session becomes clean.
    pub fn load_graph(&mut self, chart_id: &str, graph: NodeGraph) {
        if self.is_dirty() {
            warn!(
                "discarding unsaved changes to {}",
                self.chart_id().unwrap_or_default()
            );
        }
        debug!(
            "loaded chart {} ({} nodes, {} tables)",
            chart_id,
            graph.len(),
            graph.tables().len()
        );
        self.loaded = Some(LoadedChart {
            chart_id: chart_id.to_string(),
            graph,
        });
        self.dirty = false;
        self.last_saved_at = None;
    }

    fn graph_mut(&mut self) -> ApplicationResult<&mut NodeGraph> {
        self.loaded
            .as_mut()
            .map(|l| &mut l.graph)
            .ok_or(ApplicationError::NoChartLoaded)
    }

    // ============================================================
    // Hierarchy edits
    // ============================================================

    /// Add a node from a template under `parent_id` (or as a root).
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(
        &mut self,
        kind: TemplateKind,
        parent_id: Option<&str>,
    ) -> ApplicationResult<Node> {
        let graph = self.graph_mut()?;
        if let Some(parent) = parent_id {
            if graph.get(parent).is_none() {
                return Err(DomainError::NodeNotFound(parent.to_string()).into());
            }
        }
        let id = fresh_id(graph, kind.id_prefix());
        let node = kind.instantiate(id, parent_id.map(String::from));
        graph.insert_node(node.clone())?;
        self.dirty = true;
        debug!("added {}", node.id);
        Ok(node)
    }

    /// Merge `patch` onto node `id`; a changed id also rewrites every link to it.
    #[instrument(level = "debug", skip(self, patch))]
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> ApplicationResult<()> {
        self.graph_mut()?.update_node(id, patch)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a node or table. Missing ids are a no-op and leave the state as is.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: &str) -> ApplicationResult<bool> {
        let removed = self.graph_mut()?.remove(id);
        if removed {
            self.dirty = true;
        }
        Ok(removed)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, node_id: &str, target_id: &str) -> ApplicationResult<ReparentOutcome> {
        let outcome = self.graph_mut()?.reparent(node_id, target_id)?;
        self.dirty = true;
        Ok(outcome)
    }

    /// Returns false when the node is already at that end of its siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn move_sibling(&mut self, node_id: &str, direction: Direction) -> ApplicationResult<bool> {
        let moved = self.graph_mut()?.move_sibling(node_id, direction)?;
        if moved {
            self.dirty = true;
        }
        Ok(moved)
    }

    // ============================================================
    // Annotation tables
    // ============================================================

    /// Add a table with the default content, position and size.
    pub fn add_table(&mut self) -> ApplicationResult<AnnotationTable> {
        let graph = self.graph_mut()?;
        let table = AnnotationTable::new(fresh_id(graph, TABLE_ID_PREFIX));
        graph.insert_table(table.clone())?;
        self.dirty = true;
        Ok(table)
    }

    pub fn update_table(&mut self, id: &str, patch: &TablePatch) -> ApplicationResult<()> {
        self.graph_mut()?.update_table(id, patch)?;
        self.dirty = true;
        Ok(())
    }

    pub fn move_table(&mut self, id: &str, x: f64, y: f64) -> ApplicationResult<()> {
        self.graph_mut()?.move_table(id, x, y)?;
        self.dirty = true;
        Ok(())
    }

    pub fn resize_table(&mut self, id: &str, w: f64, h: f64) -> ApplicationResult<()> {
        self.graph_mut()?.resize_table(id, w, h)?;
        self.dirty = true;
        Ok(())
    }

    // ============================================================
    // Persistence
    // ============================================================

    /// Write the graph back to its chart document.
    ///
    /// A clean session writes nothing. On failure the session stays dirty.
    #[instrument(level = "debug", skip(self))]
    pub fn save(&mut self) -> ApplicationResult<SaveOutcome> {
        let loaded = self.loaded.as_ref().ok_or(ApplicationError::NoChartLoaded)?;
        if !self.dirty {
            debug!("nothing to save");
            return Ok(SaveOutcome::Unchanged);
        }

        let data = ChartData {
            nodes: loaded.graph.to_records(),
        };
        let payload = serde_json::to_vec(&data)
            .map_err(|e| ApplicationError::operation("serialize chart", e))?;
        let fingerprint = content_hash(&payload);

        self.store
            .put_chart_data(&loaded.chart_id, &data)
            .or_persistence(&loaded.chart_id)?;

        let saved_at = Utc::now();
        let receipt = SaveReceipt {
            chart_id: loaded.chart_id.clone(),
            node_count: loaded.graph.len(),
            table_count: loaded.graph.tables().len(),
            fingerprint,
            saved_at,
        };
        self.dirty = false;
        self.last_saved_at = Some(saved_at);
        info!(
            "saved chart {} ({} nodes, {} tables)",
            receipt.chart_id, receipt.node_count, receipt.table_count
        );
        Ok(SaveOutcome::Saved(receipt))
    }
}

/// `<prefix>_<millis>`, with a numeric suffix when that is taken.
fn fresh_id(graph: &NodeGraph, prefix: &str) -> String {
    fresh_id_at(graph, prefix, Utc::now().timestamp_millis())
}

/// Ids already linked to by a dangling parent or group count as taken.
fn fresh_id_at(graph: &NodeGraph, prefix: &str, millis: i64) -> String {
    let taken = |candidate: &str| graph.contains_id(candidate) || graph.is_referenced(candidate);
    let base = format!("{}_{}", prefix, millis);
    if !taken(&base) {
        return base;
    }
    (1u64..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeRecord;

    fn graph(records: &[(&str, Option<&str>)]) -> NodeGraph {
        let records = records
            .iter()
            .map(|(id, parent)| NodeRecord {
                id: id.to_string(),
                parent_id: parent.map(str::to_string),
                ..NodeRecord::default()
            })
            .collect();
        NodeGraph::from_records(records).unwrap()
    }

    #[test]
    fn fresh_id_skips_existing_ids() {
        let g = graph(&[("emp_100", None), ("emp_100_1", None)]);
        assert_eq!(fresh_id_at(&g, "emp", 100), "emp_100_2");
    }

    #[test]
    fn fresh_id_skips_ids_of_missing_parents() {
        let g = graph(&[("orphan", Some("emp_100"))]);

        let id = fresh_id_at(&g, "emp", 100);

        assert_eq!(id, "emp_100_1");
        assert_eq!(g.roots().len(), 1);
    }
}
