//! Trace source abstraction.

use crate::error::TraceError;
use crate::types::Sample;

/// Where the samples of one dataset come from.
///
/// The engine only ever sees the loaded `Vec<Sample>`; sources exist so the
/// sweep harness can treat on-disk datasets and generated traffic the same
/// way.
pub trait TraceSource {
    /// Human readable dataset name used in reports.
    fn name(&self) -> &str;

    /// Loads the complete trace.
    fn load(&self) -> Result<Vec<Sample>, TraceError>;
}

/// A trace held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTrace {
    name: String,
    samples: Vec<Sample>,
}

impl MemoryTrace {
    /// Creates a new in-memory trace.
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the trace holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TraceSource for MemoryTrace {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Sample>, TraceError> {
        Ok(self.samples.clone())
    }
}
