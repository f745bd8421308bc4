//! JSON file stores under the data directory.
//!
//! Layout:
//! - `<data_dir>/employees.json`: array of employee records
//! - `<data_dir>/charts/<chart_id>.json`: one chart document per file

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::{ChartData, ChartDocument, ChartSummary, DepartmentFilter, EmployeeRecord};
use crate::infrastructure::traits::{
    ChartStore, EmployeeStore, FileSystem, StoreError, StoreResult,
};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const CHARTS_DIR: &str = "charts";

fn read_json<T: DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> StoreResult<T> {
    let content = fs
        .read_to_string(path)
        .map_err(|e| StoreError::io(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| StoreError::malformed(path.display().to_string(), e))
}

fn write_json<T: Serialize>(fs: &dyn FileSystem, path: &Path, value: &T) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::malformed(path.display().to_string(), e))?;
    fs.ensure_parent(path)
        .map_err(|e| StoreError::io(format!("creating parent of {}", path.display()), e))?;
    fs.write(path, &content)
        .map_err(|e| StoreError::io(format!("writing {}", path.display()), e))
}

/// Serializes read-modify-write cycles within this process.
fn lock(guard: &Mutex<()>) -> MutexGuard<'_, ()> {
    guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================
// Employees
// ============================================================

pub struct JsonEmployeeStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonEmployeeStore {
    pub fn new(fs: Arc<dyn FileSystem>, data_dir: &Path) -> Self {
        Self {
            fs,
            path: data_dir.join(EMPLOYEES_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Vec<EmployeeRecord>> {
        if !self.fs.exists(&self.path) {
            return Ok(Vec::new());
        }
        read_json(self.fs.as_ref(), &self.path)
    }

    fn save(&self, records: &[EmployeeRecord]) -> StoreResult<()> {
        write_json(self.fs.as_ref(), &self.path, &records)
    }
}

impl EmployeeStore for JsonEmployeeStore {
    #[instrument(level = "debug", skip(self))]
    fn list_employees(&self, filter: &DepartmentFilter) -> StoreResult<Vec<EmployeeRecord>> {
        let records: Vec<EmployeeRecord> = self
            .load()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        debug!("loaded {} employee records", records.len());
        Ok(records)
    }

    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    fn replace_all(&self, records: Vec<EmployeeRecord>) -> StoreResult<()> {
        let _guard = lock(&self.write_lock);
        self.save(&records)
    }

    #[instrument(level = "debug", skip(self, record), fields(id = %record.employee_id))]
    fn upsert(&self, record: EmployeeRecord) -> StoreResult<bool> {
        let id = record
            .id()
            .map(String::from)
            .ok_or_else(|| StoreError::InvalidId(record.employee_id.clone()))?;
        let _guard = lock(&self.write_lock);
        let mut records = self.load()?;
        let inserted = match records.iter_mut().find(|r| r.id() == Some(id.as_str())) {
            Some(existing) => {
                *existing = record;
                false
            }
            None => {
                records.push(record);
                true
            }
        };
        self.save(&records)?;
        Ok(inserted)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, employee_id: &str) -> StoreResult<bool> {
        let _guard = lock(&self.write_lock);
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id() != Some(employee_id.trim()));
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }
}

// ============================================================
// Charts
// ============================================================

pub struct JsonChartStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonChartStore {
    pub fn new(fs: Arc<dyn FileSystem>, data_dir: &Path) -> Self {
        Self {
            fs,
            dir: data_dir.join(CHARTS_DIR),
            write_lock: Mutex::new(()),
        }
    }

    /// Ids become file names, so only a conservative alphabet is accepted.
    fn chart_path(&self, chart_id: &str) -> StoreResult<PathBuf> {
        let valid = !chart_id.is_empty()
            && chart_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(chart_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", chart_id)))
    }
}

impl ChartStore for JsonChartStore {
    #[instrument(level = "debug", skip(self))]
    fn list_charts(&self) -> StoreResult<Vec<ChartSummary>> {
        let files = self
            .fs
            .list_files(&self.dir, "json")
            .map_err(|e| StoreError::io(format!("listing {}", self.dir.display()), e))?;
        let mut summaries: Vec<ChartSummary> = files
            .iter()
            .filter_map(|path| match read_json::<ChartDocument>(self.fs.as_ref(), path) {
                Ok(chart) => Some(chart.summary()),
                Err(e) => {
                    warn!("skipping unreadable chart {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    #[instrument(level = "debug", skip(self))]
    fn get_chart(&self, chart_id: &str) -> StoreResult<Option<ChartDocument>> {
        let path = match self.chart_path(chart_id) {
            Ok(path) => path,
            Err(StoreError::InvalidId(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        read_json(self.fs.as_ref(), &path).map(Some)
    }

    #[instrument(level = "debug", skip(self, chart), fields(id = %chart.id))]
    fn put_chart(&self, chart: &ChartDocument) -> StoreResult<()> {
        let path = self.chart_path(&chart.id)?;
        let _guard = lock(&self.write_lock);
        write_json(self.fs.as_ref(), &path, chart)
    }

    #[instrument(level = "debug", skip(self, data), fields(nodes = data.nodes.len()))]
    fn put_chart_data(&self, chart_id: &str, data: &ChartData) -> StoreResult<()> {
        let path = self.chart_path(chart_id)?;
        let _guard = lock(&self.write_lock);
        if !self.fs.exists(&path) {
            return Err(StoreError::NotFound(chart_id.to_string()));
        }
        let mut chart: ChartDocument = read_json(self.fs.as_ref(), &path)?;
        chart.data = data.clone();
        chart.updated_at = chrono::Utc::now();
        write_json(self.fs.as_ref(), &path, &chart)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_chart(&self, chart_id: &str) -> StoreResult<bool> {
        let path = self.chart_path(chart_id)?;
        let _guard = lock(&self.write_lock);
        if !self.fs.exists(&path) {
            return Ok(false);
        }
        self.fs
            .remove_file(&path)
            .map_err(|e| StoreError::io(format!("removing {}", path.display()), e))?;
        Ok(true)
    }
}
