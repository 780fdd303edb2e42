//! Error types shared by the record store, token index, and lifecycle manager.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for pool and token operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Required operator input is missing. Nothing was mutated.
    #[error("missing {0}")]
    Usage(&'static str),

    /// A record does not have the field count its kind requires.
    #[error("{kind} record has {found} fields, expected {expected}")]
    SchemaWidth {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    /// A field value cannot be stored in the line-oriented file format.
    #[error("field {index} of {kind} record contains a delimiter or line break")]
    InvalidField { kind: &'static str, index: usize },

    /// Two records of the same kind share a key.
    #[error("duplicate {kind} key '{key}'")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("{0}")]
    Validation(String),

    #[error("read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read secret: {0}")]
    Prompt(String),
}

impl PoolError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
