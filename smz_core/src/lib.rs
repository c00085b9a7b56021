//! SMZ Core - Simple Mix Zone Location-Privacy Evaluation Engine
//!
//! Replays a fully enumerated vehicular trace and measures how well a
//! single circular mix zone hides vehicles from each other:
//! 1. **k**: anonymity set size when a vehicle leaves the region
//! 2. **d_bar**: mean distance to the vehicle's still-active group peers
//! 3. **anon_duration**: time between the end of the vehicle's mix zone
//!    bucket and its departure from the region
//!
//! # Pipeline
//!
//! ```text
//! trace (smz_env) ──► MixZoneSimulator ──► StatisticsAggregator ──► ReportEmitter
//!                        │  VehicleTable        system / anonymized     .sta table
//!                        │  GroupCounters       means                   summary line
//! ```
//!
//! One simulator per `(bucket_duration, radius, dataset)` combination; runs
//! share nothing and may execute in parallel.
//!
//! # Usage
//!
//! ```ignore
//! use smz_core::{evaluate, SmzConfig};
//!
//! let samples = smz_env::load_trace("rural.srt")?;
//! let config = SmzConfig::new(50, 100.0, (2290.0, 800.0));
//! let (outcome, summary) = evaluate(&config, &samples)?;
//! ```

pub mod config;
pub mod error;
pub mod groups;
pub mod report;
pub mod simulator;
pub mod statistics;
pub mod vehicle;
pub mod zone;

// Re-export key types for convenience
pub use config::{GroupId, SmzConfig};
pub use error::SmzError;
pub use groups::GroupCounters;
pub use report::{summary_line, write_table_file, ReportEmitter, RunLabel};
pub use simulator::{simulate, ExitStats, MixZoneSimulator, SimulationOutcome, StepEvents};
pub use statistics::{aggregate, AggregateSummary, KdaMeans, KdaSums, StatisticsAggregator};
pub use vehicle::{Presence, VehicleState, VehicleTable};
pub use zone::{MixZone, Region};

use smz_env::Sample;

/// Simulates `samples` under `config` and aggregates the results.
pub fn evaluate(
    config: &SmzConfig,
    samples: &[Sample],
) -> Result<(SimulationOutcome, AggregateSummary), SmzError> {
    let outcome = simulate(config, samples)?;
    let summary = aggregate(&outcome);
    Ok((outcome, summary))
}
