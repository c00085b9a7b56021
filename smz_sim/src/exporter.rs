//! JSON exporter for sweep results.

use crate::runner::RunResult;
use serde::{Deserialize, Serialize};
use smz_core::KdaMeans;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One parameter combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub dataset: String,
    pub bucket_duration: i64,
    pub radius: f64,

    /// Means over all vehicles (`None` when there were none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<KdaMeans>,

    /// Means over anonymized vehicles (`None` when there were none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymized: Option<KdaMeans>,

    pub vehicles: usize,
    pub anonymized_vehicles: usize,
    pub smz_total: u64,
    pub residual_live: u64,
}

impl From<&RunResult> for RunRecord {
    fn from(result: &RunResult) -> Self {
        Self {
            dataset: result.label.dataset.clone(),
            bucket_duration: result.label.bucket_duration,
            radius: result.label.radius,
            system: result.summary.system_means().ok(),
            anonymized: result.summary.anonymized_means().ok(),
            vehicles: result.vehicles,
            anonymized_vehicles: result.summary.anonymized.count,
            smz_total: result.summary.smz_total,
            residual_live: result.summary.residual_live,
        }
    }
}

/// Complete sweep export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepExport {
    /// Records in sweep order
    pub runs: Vec<RunRecord>,
}

impl SweepExport {
    /// Creates an empty export.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the results of one dataset.
    pub fn extend(&mut self, results: &[RunResult]) {
        self.runs.extend(results.iter().map(RunRecord::from));
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smz_core::{AggregateSummary, KdaSums, RunLabel};

    fn result(count: usize) -> RunResult {
        RunResult {
            label: RunLabel::new("city", 25, 150.0),
            summary: AggregateSummary {
                system: KdaSums {
                    k: 2 * count as u64,
                    d_bar: 0.0,
                    anon_duration: 0,
                    count,
                },
                anonymized: KdaSums::default(),
                smz_total: 0,
                residual_live: 0,
            },
            vehicles: count,
            samples: 0,
            table_path: None,
        }
    }

    #[test]
    fn test_record_from_result() {
        let record = RunRecord::from(&result(4));

        assert_eq!(record.dataset, "city");
        assert_eq!(record.system.map(|m| m.k), Some(2.0));
        assert!(record.anonymized.is_none());
    }

    #[test]
    fn test_no_data_is_omitted_from_json() {
        let mut export = SweepExport::new();
        export.extend(&[result(0)]);

        let json = serde_json::to_value(&export).unwrap();
        let run = &json["runs"][0];

        assert!(run.get("system").is_none());
        assert_eq!(run["vehicles"], 0);
    }
}
