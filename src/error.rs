use std::path::PathBuf;

use thiserror::Error;

use crate::segment::Ordinal;

/// Main error type for segscope operations
#[derive(Error, Debug)]
pub enum SegscopeError {
    #[error("Failed to open index at {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Index snapshot is closed")]
    Closed,

    #[error("Ordinal {ordinal} out of range: snapshot holds {total} documents")]
    OutOfRange { ordinal: Ordinal, total: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Invalid field name {field:?}: must be non-empty and free of NUL bytes")]
    InvalidField { field: String },
}

/// Result type alias for segscope operations
pub type Result<T> = std::result::Result<T, SegscopeError>;

impl SegscopeError {
    pub(crate) fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SegscopeError::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort a whole inspection run rather than a
    /// single item of it
    pub fn is_fatal(&self) -> bool {
        matches!(self, SegscopeError::Open { .. } | SegscopeError::Closed)
    }
}

/// Failure while resolving an exact-term lookup.
///
/// A missing term is not an error; see [`crate::lookup::LookupOutcome`].
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Malformed field name {field:?}")]
    MalformedField { field: String },

    #[error("Index snapshot is closed")]
    Closed,

    #[error("Lookup of {field}={value:?} failed: {source}")]
    Backend {
        field: String,
        value: String,
        #[source]
        source: std::io::Error,
    },
}

/// A document that could not be materialized. Carries the offending ordinal
/// so batch callers can report it and move on.
#[derive(Error, Debug)]
#[error("Failed to fetch document {ordinal}: {cause}")]
pub struct FetchFailure {
    pub ordinal: Ordinal,
    #[source]
    pub cause: SegscopeError,
}

impl FetchFailure {
    pub fn new(ordinal: Ordinal, cause: SegscopeError) -> Self {
        Self { ordinal, cause }
    }
}
