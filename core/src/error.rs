use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a snapshot from a set of source documents.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("no documents to index; check that the corpus directory exists and contains markdown files")]
    NoDocuments,

    #[error("cannot format build timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Failure to write a snapshot to disk.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure to materialize the searchable structure.
///
/// Cloneable because the query engine caches a failed load and hands the
/// same error to every later caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Documentation index not found at {path}. Please run: docsearch-indexer build --input <docs> --output {path}")]
    Missing { path: PathBuf },

    #[error("Failed to read documentation index {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Malformed documentation index: {message}")]
    Malformed { message: String },

    #[error("Invalid documentation index field '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl LoadError {
    /// True when the remedy is to (re)build the index rather than fix its contents.
    pub fn is_missing(&self) -> bool {
        matches!(self, LoadError::Missing { .. })
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Invalid { field: field.into(), message: message.into() }
    }
}
