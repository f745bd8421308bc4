//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) | CliError::Application(e) => {
                application_exit_code(e)
            }
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(_) => exitcode::DATAERR,
        ApplicationError::SourceData { .. } => exitcode::DATAERR,
        ApplicationError::Persistence { .. } => exitcode::IOERR,
        ApplicationError::ChartNotFound(_) => exitcode::NOINPUT,
        ApplicationError::NotVisible { .. } | ApplicationError::NotOwner { .. } => {
            exitcode::NOPERM
        }
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::NoChartLoaded | ApplicationError::OperationFailed { .. } => {
            exitcode::SOFTWARE
        }
    }
}
