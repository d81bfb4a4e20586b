//! Errors that abort an export run.
//!
//! Everything else (unknown consent answers, unknown membership types, short
//! rows) is absorbed by normalization and never surfaces here.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T, E = ExportError> = std::result::Result<T, E>;

/// Fatal conditions detected before or while producing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A column the classifier depends on is not in the header row.
    #[error("required column '{column}' not found; available columns: {available:?}")]
    MissingColumn {
        /// The missing column name.
        column: String,
        /// The header row that was actually read.
        available: Vec<String>,
    },

    /// The input or output could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The delimited text could not be parsed or serialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The export policy is malformed or violates its own invariants.
    #[error("invalid export policy: {0}")]
    Policy(String),

    /// The workbook could not be opened or walked.
    #[cfg(feature = "xlsx")]
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
