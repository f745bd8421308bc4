//! Employee maintenance service
//!
//! Every change to the employee store drops the cached hierarchies.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::error_ext::StoreResultExt;
use crate::application::services::HierarchyService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DepartmentFilter, DomainError, EmployeeRecord};
use crate::infrastructure::traits::{EmployeeStore, StoreError};

/// Result of a full sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows without an employee id
    pub skipped: usize,
}

/// An employee with a known last working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub employee_id: String,
    pub full_name: String,
    pub department: String,
    pub last_working_day: NaiveDate,
}

pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    hierarchy: Arc<HierarchyService>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, hierarchy: Arc<HierarchyService>) -> Self {
        Self { store, hierarchy }
    }

    /// Decode a JSON array of HR rows.
    pub fn parse_rows(content: &str) -> ApplicationResult<Vec<EmployeeRecord>> {
        serde_json::from_str(content)
            .map_err(|e| ApplicationError::operation("parse employee rows", e))
    }

    /// Replace the whole dataset with `records`.
    ///
    /// Rows without an id are dropped; a repeated id rejects the import and
    /// leaves the store untouched.
    #[instrument(level = "debug", skip(self, records), fields(rows = records.len()))]
    pub fn import(&self, records: Vec<EmployeeRecord>) -> ApplicationResult<ImportSummary> {
        let total = records.len();
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(total);
        for record in records {
            let Some(id) = record.id().map(String::from) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                return Err(ApplicationError::operation(
                    "import employees",
                    StoreError::Duplicate(id),
                ));
            }
            kept.push(record);
        }

        let summary = ImportSummary {
            imported: kept.len(),
            skipped: total - kept.len(),
        };
        if summary.skipped > 0 {
            warn!("dropped {} rows without employee id", summary.skipped);
        }

        self.store.replace_all(kept).with_context("import employees")?;
        self.hierarchy.invalidate();
        info!("imported {} employees", summary.imported);
        Ok(summary)
    }

    /// Insert or replace one record. Returns true when it was new.
    #[instrument(level = "debug", skip(self, record), fields(id = %record.employee_id))]
    pub fn upsert(&self, record: EmployeeRecord) -> ApplicationResult<bool> {
        if record.id().is_none() {
            return Err(DomainError::validation("employeeId", "must not be empty").into());
        }
        let inserted = self.store.upsert(record).with_context("save employee")?;
        self.hierarchy.invalidate();
        Ok(inserted)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, employee_id: &str) -> ApplicationResult<bool> {
        let removed = self
            .store
            .delete(employee_id)
            .with_context("delete employee")?;
        if removed {
            self.hierarchy.invalidate();
        }
        Ok(removed)
    }

    pub fn list(&self, filter: &DepartmentFilter) -> ApplicationResult<Vec<EmployeeRecord>> {
        self.store.list_employees(filter).or_source_data()
    }

    /// Employees leaving between `today` and `today + within_days`, inclusive,
    /// soonest first.
    pub fn upcoming_departures(
        &self,
        today: NaiveDate,
        within_days: i64,
    ) -> ApplicationResult<Vec<Departure>> {
        let until = Duration::try_days(within_days.max(0))
            .and_then(|window| today.checked_add_signed(window))
            .unwrap_or(NaiveDate::MAX);
        let mut departures: Vec<Departure> = self
            .list(&DepartmentFilter::All)?
            .into_iter()
            .filter_map(|record| {
                let date = record.leaving()?;
                let id = record.id()?.to_string();
                (today..=until).contains(&date).then(|| Departure {
                    employee_id: id,
                    full_name: record.full_name.clone(),
                    department: record.department.clone(),
                    last_working_day: date,
                })
            })
            .collect();
        departures.sort_by(|a, b| {
            a.last_working_day
                .cmp(&b.last_working_day)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        Ok(departures)
    }
}
