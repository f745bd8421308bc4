//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("failed to persist chart {chart_id}")]
    Persistence {
        chart_id: String,
        #[source]
        source: StoreError,
    },

    #[error("employee data unavailable")]
    SourceData {
        #[source]
        source: StoreError,
    },

    #[error("chart not found: {0}")]
    ChartNotFound(String),

    #[error("chart {chart_id} is not visible to {username}")]
    NotVisible { chart_id: String, username: String },

    #[error("chart {chart_id} is not owned by {username}")]
    NotOwner { chart_id: String, username: String },

    #[error("no chart loaded")]
    NoChartLoaded,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn operation(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::OperationFailed {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
