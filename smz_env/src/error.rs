//! Error types for trace loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or validating a trace.
///
/// Line numbers are 1-based. Any of these aborts the run: the engine sizes
/// its tables from the complete trace, so a partial trace is never used.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened or read
    #[error("Cannot read trace {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already open stream failed
    #[error("Read error: {0}")]
    Read(#[from] std::io::Error),

    /// A line did not hold exactly four fields
    #[error("Line {line}: expected 4 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    /// A field could not be parsed as its expected type
    #[error("Line {line}: invalid {field} '{token}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        token: String,
    },

    /// Vehicle ids must be positive integers
    #[error("Line {line}: vehicle id must be positive, got {id}")]
    NonPositiveVehicleId { line: usize, id: i64 },

    /// A tick lies outside `[-MAX_TICK, MAX_TICK]`
    #[error("Line {line}: time {time} is out of range")]
    TickOutOfRange { line: usize, time: i64 },

    /// The trace is not sorted by (time, vehicle id)
    #[error("Sample {index} is out of (time, vehicle) order")]
    OutOfOrder { index: usize },
}

impl TraceError {
    /// Creates an open error for the given path.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid field error.
    pub fn invalid(line: usize, field: &'static str, token: &str) -> Self {
        Self::InvalidField {
            line,
            field,
            token: token.to_string(),
        }
    }
}
