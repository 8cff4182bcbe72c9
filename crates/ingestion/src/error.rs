//! Error types for the ingestion crate.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentError;

/// Errors that can occur while detecting, crawling or building a candidate.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("Failed to read manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required metadata: {0}")]
    MissingMetadata(String),

    #[error("Raster file does not exist: {}", .0.display())]
    MissingRaster(PathBuf),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown sensor family: {0}")]
    UnknownFamily(String),
}

impl IngestionError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestionError::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn document(path: impl Into<PathBuf>, source: impl Into<DocumentError>) -> Self {
        IngestionError::Document {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        IngestionError::MissingMetadata(what.into())
    }

    /// Which class of failure this is, for log fields.
    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestionError::FileRead { .. } => ErrorCategory::Io,
            IngestionError::Manifest { source, .. } if source.is_io_error() => ErrorCategory::Io,
            IngestionError::Document { .. }
            | IngestionError::Manifest { .. }
            | IngestionError::InvalidValue { .. } => ErrorCategory::Malformed,
            IngestionError::MissingMetadata(_) | IngestionError::MissingRaster(_) => {
                ErrorCategory::MissingMandatory
            }
            IngestionError::InvalidConfig(_) | IngestionError::UnknownFamily(_) => {
                ErrorCategory::Config
            }
        }
    }
}

/// Coarse failure classes reported alongside skipped candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Io,
    Malformed,
    MissingMandatory,
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Io => "io",
            ErrorCategory::Malformed => "malformed",
            ErrorCategory::MissingMandatory => "missing-mandatory",
            ErrorCategory::Config => "config",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
