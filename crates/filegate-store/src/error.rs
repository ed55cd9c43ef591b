//! Error types for the filegate-store crate
//!
//! Backend-specific failures are normalized here, once, at the storage
//! boundary. Absence of a key is never an error: operations that can miss
//! return `Ok(None)` instead.

use std::fmt;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Boxed underlying cause carried for logging
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The store operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Put,
    Get,
    List,
    Delete,
    /// Reading the body of a fetched object
    Read,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Get => "get",
            Self::List => "list",
            Self::Delete => "delete",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during object storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Any transport, credential or service failure other than a missing key
    #[error("object store unavailable: {operation} failed: {source}")]
    Unavailable {
        operation: Operation,
        key: Option<String>,
        #[source]
        source: BoxError,
    },

    /// The client could not be built from the supplied configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Wrap an underlying cause as `Unavailable`
    pub fn unavailable(
        operation: Operation,
        key: Option<&str>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Unavailable {
            operation,
            key: key.map(str::to_string),
            source: source.into(),
        }
    }

    /// The operation that failed, if this error came from one
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Unavailable { operation, .. } => Some(*operation),
            Self::Configuration(_) => None,
        }
    }

    /// The key involved, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Unavailable { key, .. } => key.as_deref(),
            Self::Configuration(_) => None,
        }
    }
}
