//! SMZ Simulation Harness
//!
//! Everything around the engine that turns it into an experiment:
//! - **Datasets**: named traces with their fixed mix zone centers
//! - **Sweeps**: one independent engine run per `(duration, radius)`
//!   combination, optionally in parallel
//! - **Export**: per-vehicle tables, summary lines and a JSON record
//! - **Trace preparation**: interpolation of sparse movement files and a
//!   seeded synthetic traffic oracle
//!
//! # Usage
//!
//! ```ignore
//! use smz_sim::{DatasetId, SweepRunner};
//!
//! let runner = SweepRunner::new().with_parallel(true);
//! let dataset = DatasetId::Rural;
//! let results = runner.run_source(&dataset.trace("data".as_ref()), dataset.center())?;
//! for r in &results {
//!     println!("{}", r.summary_line());
//! }
//! ```

pub mod datasets;
pub mod exporter;
pub mod interpolate;
pub mod oracle;
pub mod runner;

pub use datasets::DatasetId;
pub use exporter::{RunRecord, SweepExport};
pub use interpolate::{interpolate, load_movements, InterpolateError, MovementRecord};
pub use oracle::{OracleError, TrafficConfig, TrafficOracle};
pub use runner::{RunResult, SweepError, SweepRunner};
