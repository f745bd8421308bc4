//! Chart catalog: ownership and visibility of chart documents
//!
//! A chart is visible to its owner and, when public, to everyone.
//! Only the owner may publish, unpublish or delete it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::error_ext::StoreResultExt;
use crate::application::services::{ChartSession, HierarchyService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    ChartData, ChartDocument, ChartSummary, DepartmentFilter, DomainError, NodeGraph, NodeRecord,
};
use crate::infrastructure::traits::ChartStore;

/// Input for a new chart document.
#[derive(Debug, Clone, Default)]
pub struct NewChart {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub nodes: Vec<NodeRecord>,
}

pub struct ChartCatalog {
    store: Arc<dyn ChartStore>,
    hierarchy: Arc<HierarchyService>,
}

impl ChartCatalog {
    pub fn new(store: Arc<dyn ChartStore>, hierarchy: Arc<HierarchyService>) -> Self {
        Self { store, hierarchy }
    }

    /// The user's own charts plus every public chart, newest first.
    #[instrument(level = "debug", skip(self))]
    pub fn list_visible(&self, username: &str) -> ApplicationResult<Vec<ChartSummary>> {
        let charts = self.store.list_charts().with_context("list charts")?;
        Ok(charts
            .into_iter()
            .filter(|c| c.is_public || c.owner == username)
            .collect())
    }

    /// Store a new chart owned by `owner` under a fresh id.
    ///
    /// The nodes are decoded and re-encoded, so legacy shapes are normalized
    /// and structural problems are rejected before anything is written.
    #[instrument(level = "debug", skip(self, chart), fields(name = %chart.name))]
    pub fn create(&self, owner: &str, chart: NewChart) -> ApplicationResult<ChartDocument> {
        if chart.name.trim().is_empty() {
            return Err(DomainError::validation("name", "must not be empty").into());
        }
        if owner.trim().is_empty() {
            return Err(DomainError::validation("owner", "must not be empty").into());
        }
        let graph = NodeGraph::from_records(chart.nodes)?;

        let now = Utc::now();
        let document = ChartDocument {
            id: Uuid::new_v4().to_string(),
            name: chart.name.trim().to_string(),
            description: chart.description,
            owner: owner.to_string(),
            is_public: chart.is_public,
            data: ChartData {
                nodes: graph.to_records(),
            },
            created_at: now,
            updated_at: now,
        };
        self.store
            .put_chart(&document)
            .or_persistence(&document.id)?;
        info!("created chart {} ({} records)", document.id, document.data.nodes.len());
        Ok(document)
    }

    /// Fetch a chart the user may see.
    pub fn get(&self, chart_id: &str, username: &str) -> ApplicationResult<ChartDocument> {
        let chart = self
            .store
            .get_chart(chart_id)
            .with_context("load chart")?
            .ok_or_else(|| ApplicationError::ChartNotFound(chart_id.to_string()))?;
        if !chart.is_visible_to(username) {
            return Err(ApplicationError::NotVisible {
                chart_id: chart_id.to_string(),
                username: username.to_string(),
            });
        }
        Ok(chart)
    }

    /// Editing session on a visible chart.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, chart_id: &str, username: &str) -> ApplicationResult<ChartSession> {
        let chart = self.get(chart_id, username)?;
        let graph = NodeGraph::from_records(chart.data.nodes)?;
        let mut session = ChartSession::new(Arc::clone(&self.store));
        session.load_graph(&chart.id, graph);
        Ok(session)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn set_public(
        &self,
        chart_id: &str,
        username: &str,
        is_public: bool,
    ) -> ApplicationResult<ChartDocument> {
        let mut chart = self.owned(chart_id, username)?;
        chart.is_public = is_public;
        chart.updated_at = Utc::now();
        self.store.put_chart(&chart).or_persistence(chart_id)?;
        Ok(chart)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, chart_id: &str, username: &str) -> ApplicationResult<()> {
        self.owned(chart_id, username)?;
        self.store
            .delete_chart(chart_id)
            .or_persistence(chart_id)?;
        info!("deleted chart {}", chart_id);
        Ok(())
    }

    /// Flat records of the current hierarchy, to seed a new chart.
    pub fn snapshot_from_hierarchy(
        &self,
        filter: &DepartmentFilter,
    ) -> ApplicationResult<Vec<NodeRecord>> {
        let nodes = self.hierarchy.get_hierarchy(filter)?;
        Ok(NodeGraph::from_nodes(nodes.to_vec())?.to_records())
    }

    fn owned(&self, chart_id: &str, username: &str) -> ApplicationResult<ChartDocument> {
        let chart = self.get(chart_id, username)?;
        if chart.owner != username {
            return Err(ApplicationError::NotOwner {
                chart_id: chart_id.to_string(),
                username: username.to_string(),
            });
        }
        Ok(chart)
    }
}
