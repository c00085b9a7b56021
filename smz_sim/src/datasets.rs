//! Named mobility datasets and their mix zone placements.

use smz_env::FileTrace;
use std::path::Path;

/// Dataset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    /// Sparse rural road network
    Rural,

    /// Suburban grid
    Urban,

    /// Dense city center
    City,
}

impl DatasetId {
    /// Returns a list of all datasets, in sweep order.
    pub fn all() -> Vec<DatasetId> {
        vec![DatasetId::Rural, DatasetId::Urban, DatasetId::City]
    }

    /// Returns the dataset name.
    pub fn name(&self) -> &'static str {
        match self {
            DatasetId::Rural => "rural",
            DatasetId::Urban => "urban",
            DatasetId::City => "city",
        }
    }

    /// Returns a description of the dataset.
    pub fn description(&self) -> &'static str {
        match self {
            DatasetId::Rural => "GMSF rural mobility, mix zone at a highway junction",
            DatasetId::Urban => "GMSF urban mobility, mix zone at a main crossing",
            DatasetId::City => "GMSF city mobility, mix zone in the downtown core",
        }
    }

    /// Fixed mix zone center for this dataset (meters).
    pub fn center(&self) -> (f64, f64) {
        match self {
            DatasetId::Rural => (2290.0, 800.0),
            DatasetId::Urban => (1430.0, 2490.0),
            DatasetId::City => (390.0, 1710.0),
        }
    }

    /// Sorted trace file name, e.g. `rural.srt`.
    pub fn file_name(&self) -> String {
        format!("{}.srt", self.name())
    }

    /// Trace source for this dataset under `data_dir`.
    pub fn trace(&self, data_dir: &Path) -> FileTrace {
        FileTrace::new(data_dir.join(self.file_name())).with_name(self.name())
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DatasetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rural" => Ok(DatasetId::Rural),
            "urban" => Ok(DatasetId::Urban),
            "city" => Ok(DatasetId::City),
            "all" => Err("Use DatasetId::all() for every dataset".to_string()),
            _ => Err(format!("Unknown dataset: {}", s)),
        }
    }
}
