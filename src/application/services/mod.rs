//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (EmployeeStore, ChartStore)
//! but are themselves concrete structs, not traits.

mod charts;
mod editor;
mod employees;
mod hierarchy;

pub use charts::{ChartCatalog, NewChart};
pub use editor::{ChartSession, SaveOutcome, SaveReceipt, SessionState};
pub use employees::{Departure, EmployeeService, ImportSummary};
pub use hierarchy::{Hierarchy, HierarchyService, HIERARCHY_CACHE_PREFIX};
