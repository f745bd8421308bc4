//! Error conversion helpers for store operations
//!
//! Provides an extension trait that attaches the failing use case to a
//! `StoreError`.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::StoreResult;

/// Extension trait for converting `StoreResult` to `ApplicationResult`.
pub trait StoreResultExt<T> {
    /// Employee store failures surface as source data errors.
    ///
    /// # Example
    /// ```ignore
    /// let records = store.list_employees(&filter).or_source_data()?;
    /// ```
    fn or_source_data(self) -> ApplicationResult<T>;

    /// Chart store failures while persisting `chart_id`.
    fn or_persistence(self, chart_id: &str) -> ApplicationResult<T>;

    /// Any other store failure, with a description of the step.
    fn with_context(self, context: &str) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn or_source_data(self) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::SourceData { source })
    }

    fn or_persistence(self, chart_id: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Persistence {
            chart_id: chart_id.to_string(),
            source,
        })
    }

    fn with_context(self, context: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::operation(context, e))
    }
}
