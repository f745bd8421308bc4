//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the chart's structural invariants.
///
/// Every operation that returns one of these has left the graph untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("id already in use: {0}")]
    DuplicateId(String),

    #[error("cycle detected: {node} is an ancestor of {target}")]
    CycleDetected { node: String, target: String },

    #[error("not a hierarchy node: {0}")]
    NotHierarchical(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
