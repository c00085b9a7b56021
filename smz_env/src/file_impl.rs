//! File-backed implementation of [`TraceSource`].

use crate::error::TraceError;
use crate::source::TraceSource;
use crate::trace::load_trace;
use crate::types::Sample;
use std::path::{Path, PathBuf};

/// A trace stored in a text file (`.srt`).
#[derive(Debug, Clone)]
pub struct FileTrace {
    path: PathBuf,
    name: String,
}

impl FileTrace {
    /// Creates a file trace named after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// Overrides the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSource for FileTrace {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Sample>, TraceError> {
        load_trace(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_stem() {
        let trace = FileTrace::new("/data/rural.srt");
        assert_eq!(trace.name(), "rural");

        let renamed = trace.with_name("rural-2015");
        assert_eq!(renamed.name(), "rural-2015");
    }
}
