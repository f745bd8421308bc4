//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ChartCatalog, EmployeeService, HierarchyService};
use crate::config::Settings;
use crate::infrastructure::stores::{JsonChartStore, JsonEmployeeStore};
use crate::infrastructure::traits::{ChartStore, EmployeeStore, FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub employee_store: Arc<dyn EmployeeStore>,
    pub chart_store: Arc<dyn ChartStore>,

    pub hierarchy: Arc<HierarchyService>,
    pub employees: EmployeeService,
    pub charts: ChartCatalog,
}

impl ServiceContainer {
    /// Create a new service container with JSON stores under `settings.data_dir`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let employee_store = Arc::new(JsonEmployeeStore::new(Arc::clone(&fs), &settings.data_dir));
        let chart_store = Arc::new(JsonChartStore::new(Arc::clone(&fs), &settings.data_dir));
        Self::with_deps(settings, fs, employee_store, chart_store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        employee_store: Arc<dyn EmployeeStore>,
        chart_store: Arc<dyn ChartStore>,
    ) -> Self {
        let settings = Arc::new(settings);
        let hierarchy = Arc::new(HierarchyService::new(
            Arc::clone(&employee_store),
            Arc::clone(&settings),
        ));
        let employees = EmployeeService::new(Arc::clone(&employee_store), Arc::clone(&hierarchy));
        let charts = ChartCatalog::new(Arc::clone(&chart_store), Arc::clone(&hierarchy));

        Self {
            settings,
            fs,
            employee_store,
            chart_store,
            hierarchy,
            employees,
            charts,
        }
    }
}
