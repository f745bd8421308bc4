//! Cached hierarchy service
//!
//! Fetches employee records, runs the hierarchy builder and caches the
//! result per department filter.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::error_ext::StoreResultExt;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    build_hierarchy, DepartmentFilter, ForestBuilder, LinkPreference, Node, NodeGraph, TreeArena,
};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::traits::{EmployeeStore, StoreError};

/// Every hierarchy cache key starts with this.
pub const HIERARCHY_CACHE_PREFIX: &str = "orgchart:";

pub type Hierarchy = Arc<Vec<Node>>;

/// Service for building and caching hierarchies.
pub struct HierarchyService {
    store: Arc<dyn EmployeeStore>,
    settings: Arc<Settings>,
    cache: TtlCache<Hierarchy>,
}

impl HierarchyService {
    pub fn new(store: Arc<dyn EmployeeStore>, settings: Arc<Settings>) -> Self {
        let cache = TtlCache::new(settings.cache_ttl());
        Self {
            store,
            settings,
            cache,
        }
    }

    /// Hierarchy for `filter`, computed at most once per key until it expires
    /// or is invalidated.
    #[instrument(level = "debug", skip(self), fields(key = %filter.cache_key()))]
    pub fn get_hierarchy(&self, filter: &DepartmentFilter) -> ApplicationResult<Hierarchy> {
        let today = Local::now().date_naive();
        self.cache
            .get_or_compute(&filter.cache_key(), || self.compute(filter, today))
            .map_err(|shared| ApplicationError::SourceData {
                source: Arc::try_unwrap(shared).unwrap_or_else(StoreError::Shared),
            })
    }

    /// Build without touching the cache.
    pub fn build_on(
        &self,
        filter: &DepartmentFilter,
        today: NaiveDate,
    ) -> ApplicationResult<Vec<Node>> {
        self.compute(filter, today)
            .map(|nodes| nodes.to_vec())
            .or_source_data()
    }

    fn compute(&self, filter: &DepartmentFilter, today: NaiveDate) -> Result<Hierarchy, StoreError> {
        let records = self.store.list_employees(filter)?;
        let options = self.settings.build_options(today);
        Ok(Arc::new(build_hierarchy(&records, filter, &options)))
    }

    /// Compute the per-department hierarchies in parallel.
    ///
    /// Returns `(department, node count)` pairs in input order.
    #[instrument(level = "debug", skip(self, departments), fields(count = departments.len()))]
    pub fn warm(&self, departments: &[String]) -> ApplicationResult<Vec<(String, usize)>> {
        let warmed = departments
            .par_iter()
            .map(|dept| {
                let filter = DepartmentFilter::Department(dept.clone());
                self.get_hierarchy(&filter)
                    .map(|nodes| (dept.clone(), nodes.len()))
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        info!("warmed {} department hierarchies", warmed.len());
        Ok(warmed)
    }

    /// Distinct non-empty departments, sorted.
    pub fn departments(&self) -> ApplicationResult<Vec<String>> {
        let records = self
            .store
            .list_employees(&DepartmentFilter::All)
            .or_source_data()?;
        Ok(records
            .into_iter()
            .map(|r| r.department.trim().to_string())
            .filter(|d| !d.is_empty())
            .sorted()
            .dedup()
            .collect())
    }

    /// Display trees for the cached hierarchy.
    pub fn forest(
        &self,
        filter: &DepartmentFilter,
        preference: LinkPreference,
    ) -> ApplicationResult<Vec<TreeArena>> {
        let nodes = self.get_hierarchy(filter)?;
        let graph = NodeGraph::from_nodes(nodes.to_vec())?;
        Ok(ForestBuilder::new(preference).build(&graph)?)
    }

    /// Drop every cached hierarchy.
    pub fn invalidate(&self) {
        debug!("invalidating cached hierarchies");
        self.cache.invalidate_prefix(HIERARCHY_CACHE_PREFIX);
    }
}
