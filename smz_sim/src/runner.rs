//! Sweep runner - evaluates every (bucket duration, radius) combination.

use smz_core::{evaluate, summary_line, write_table_file, AggregateSummary, RunLabel, SmzConfig, SmzError};
use smz_env::{Sample, Tick, TraceError, TraceSource};

use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from a parameter sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The dataset trace could not be loaded
    #[error("Dataset {dataset}: {source}")]
    Load {
        dataset: String,
        #[source]
        source: TraceError,
    },

    /// One combination failed
    #[error("Dataset {dataset} (duration={duration}s, radius={radius}m): {source}")]
    Run {
        dataset: String,
        duration: Tick,
        radius: f64,
        #[source]
        source: SmzError,
    },

    /// Nothing to sweep over
    #[error("Sweep has no {0} values")]
    EmptyAxis(&'static str),
}

/// Result of one parameter combination.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Dataset and parameters
    pub label: RunLabel,

    /// Aggregated statistics
    pub summary: AggregateSummary,

    /// Vehicles in the id range
    pub vehicles: usize,

    /// Samples consumed
    pub samples: usize,

    /// Where the per-vehicle table was written, if anywhere
    pub table_path: Option<PathBuf>,
}

impl RunResult {
    /// The printed summary line for this run.
    pub fn summary_line(&self) -> String {
        summary_line(&self.label, &self.summary)
    }
}

/// Runs the Cartesian product of durations and radii over a dataset.
#[derive(Debug, Clone)]
pub struct SweepRunner {
    /// Bucket durations (seconds)
    durations: Vec<Tick>,

    /// Capture radii (meters)
    radii: Vec<f64>,

    /// Run combinations on the rayon pool
    parallel: bool,

    /// Directory for per-vehicle tables
    table_dir: Option<PathBuf>,

    /// Parameters shared by every combination
    base: SmzConfig,
}

impl Default for SweepRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepRunner {
    /// Creates a runner with the reference sweep: 25..100s by 25, 50..150m by 50.
    pub fn new() -> Self {
        Self {
            durations: vec![25, 50, 75, 100],
            radii: vec![50.0, 100.0, 150.0],
            parallel: false,
            table_dir: None,
            base: SmzConfig::default(),
        }
    }

    /// Sets the bucket durations.
    pub fn with_durations(mut self, durations: Vec<Tick>) -> Self {
        self.durations = durations;
        self
    }

    /// Sets the capture radii.
    pub fn with_radii(mut self, radii: Vec<f64>) -> Self {
        self.radii = radii;
        self
    }

    /// Enables parallel execution of independent combinations.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Writes a per-vehicle table for every combination into `dir`.
    pub fn with_table_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.table_dir = Some(dir.into());
        self
    }

    /// Sets region, edge threshold and total time shared by all runs.
    pub fn with_base_config(mut self, base: SmzConfig) -> Self {
        self.base = base;
        self
    }

    /// All combinations in sweep order (duration major, radius minor).
    pub fn combinations(&self) -> Vec<(Tick, f64)> {
        self.durations
            .iter()
            .flat_map(|&d| self.radii.iter().map(move |&r| (d, r)))
            .collect()
    }

    /// Loads a dataset once and sweeps it.
    pub fn run_source(
        &self,
        source: &dyn TraceSource,
        center: (f64, f64),
    ) -> Result<Vec<RunResult>, SweepError> {
        info!("Loading dataset {}", source.name());
        let samples = source.load().map_err(|e| SweepError::Load {
            dataset: source.name().to_string(),
            source: e,
        })?;
        self.run_samples(source.name(), center, &samples)
    }

    /// Sweeps an already loaded trace.
    ///
    /// Results come back in sweep order whether or not the runs were
    /// executed in parallel.
    pub fn run_samples(
        &self,
        dataset: &str,
        center: (f64, f64),
        samples: &[Sample],
    ) -> Result<Vec<RunResult>, SweepError> {
        if self.durations.is_empty() {
            return Err(SweepError::EmptyAxis("duration"));
        }
        if self.radii.is_empty() {
            return Err(SweepError::EmptyAxis("radius"));
        }

        let combinations = self.combinations();
        info!(
            "Sweeping {}: {} combinations over {} samples{}",
            dataset,
            combinations.len(),
            samples.len(),
            if self.parallel { " (parallel)" } else { "" }
        );

        if self.parallel {
            combinations
                .par_iter()
                .map(|&(d, r)| self.run_one(dataset, center, d, r, samples))
                .collect()
        } else {
            combinations
                .iter()
                .map(|&(d, r)| self.run_one(dataset, center, d, r, samples))
                .collect()
        }
    }

    fn run_one(
        &self,
        dataset: &str,
        center: (f64, f64),
        duration: Tick,
        radius: f64,
        samples: &[Sample],
    ) -> Result<RunResult, SweepError> {
        let wrap = |source: SmzError| SweepError::Run {
            dataset: dataset.to_string(),
            duration,
            radius,
            source,
        };

        let config = self
            .base
            .clone()
            .with_bucket_duration(duration)
            .with_radius(radius)
            .with_center(center.0, center.1);

        let (outcome, summary) = evaluate(&config, samples).map_err(wrap)?;

        let table_path = match &self.table_dir {
            Some(dir) => {
                let path = dir.join(format!("{}_{}_{}.sta", dataset, duration, radius));
                write_table_file(&path, &outcome.table).map_err(wrap)?;
                debug!("Wrote {} rows to {}", outcome.table.len(), path.display());
                Some(path)
            }
            None => None,
        };

        let result = RunResult {
            label: RunLabel::new(dataset, duration, radius),
            summary,
            vehicles: outcome.table.len(),
            samples: outcome.samples_processed,
            table_path,
        };
        info!("{}", result.summary_line());

        Ok(result)
    }
}
