//! I/O boundary traits for testability
//!
//! These traits abstract the filesystem and the two record stores, allowing
//! services to be tested with in-memory or failing implementations.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::{ChartData, ChartDocument, ChartSummary, DepartmentFilter, EmployeeRecord};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content; readers never observe a partial write.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Files directly inside `dir` with the given extension, sorted by path.
    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Failure of a store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    #[error("duplicate record id: {0}")]
    Duplicate(String),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed data in {context}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failure of a computation another caller was waiting on.
    #[error(transparent)]
    Shared(Arc<StoreError>),
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn malformed(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Malformed {
            context: context.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Source of employee records.
pub trait EmployeeStore: Send + Sync {
    /// Records selected by `filter`, in stored order.
    fn list_employees(&self, filter: &DepartmentFilter) -> StoreResult<Vec<EmployeeRecord>>;

    /// Replace the whole dataset.
    fn replace_all(&self, records: Vec<EmployeeRecord>) -> StoreResult<()>;

    /// Insert or replace by employee id. Returns true when the id was new.
    fn upsert(&self, record: EmployeeRecord) -> StoreResult<bool>;

    /// Returns false when no record had the id.
    fn delete(&self, employee_id: &str) -> StoreResult<bool>;
}

/// Persistence of chart documents.
pub trait ChartStore: Send + Sync {
    /// Summaries of all documents, newest update first.
    fn list_charts(&self) -> StoreResult<Vec<ChartSummary>>;

    fn get_chart(&self, chart_id: &str) -> StoreResult<Option<ChartDocument>>;

    /// Create or overwrite a whole document.
    fn put_chart(&self, chart: &ChartDocument) -> StoreResult<()>;

    /// Replace only the node payload of an existing document.
    fn put_chart_data(&self, chart_id: &str, data: &ChartData) -> StoreResult<()>;

    /// Returns false when the document did not exist.
    fn delete_chart(&self, chart_id: &str) -> StoreResult<bool>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        use walkdir::WalkDir;

        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(extension)
            {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}
