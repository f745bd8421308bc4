//! Shared test support: logging setup and record fixtures.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

use crate::domain::EmployeeRecord;

static TEST_LOGGING: Once = Once::new();

/// Route tracing output through the test harness, once per process.
///
/// `RUST_LOG` overrides the default `orgchart=debug` filter.
pub fn init_test_setup() {
    TEST_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("orgchart=debug"));
        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter);
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            debug!("tracing subscriber already installed");
        }
    });
}

/// HR row carrying the fields the hierarchy builder reads.
pub fn employee(id: &str, line_manager: &str, department: &str) -> EmployeeRecord {
    EmployeeRecord {
        employee_id: id.into(),
        full_name: format!("Person {id}"),
        job_title: "Engineer".into(),
        department: department.into(),
        line_manager_raw: line_manager.into(),
        ..EmployeeRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_setup_is_idempotent() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn employee_fixture_has_an_id() {
        let record = employee("7", "1: Boss", "Eng");
        assert_eq!(record.id(), Some("7"));
        assert_eq!(record.manager_key().unwrap().as_str(), "1");
    }
}
