//! SMZ Trace Environment Layer
//!
//! This crate is the input side of the simple mix zone (SMZ) evaluator.
//! It owns everything the engine needs to know about where vehicle
//! positions come from, and nothing about what is done with them:
//! - **Samples**: `(time, vehicle_id, x, y)` records, one per vehicle per tick
//! - **Loading**: strict line-oriented parsing of fully enumerated traces
//! - **Sources**: the [`TraceSource`] abstraction over files and memory
//!
//! # Trace format
//!
//! ```text
//! 0 1 1435.34 1539.1
//! 0 2 12.5 2990.0
//! 1 1 1454.02 1540.3
//! ```
//!
//! One sample per line, sorted by time then vehicle id. The ordering is a
//! precondition; [`check_ordering`] is available to callers who want to
//! verify it, but the loader never re-sorts.
//!
//! # Example
//!
//! ```ignore
//! use smz_env::{FileTrace, TraceSource};
//!
//! let trace = FileTrace::new("rural.srt");
//! let samples = trace.load()?;
//! ```

mod error;
mod file_impl;
mod source;
mod trace;
mod types;

pub use error::TraceError;
pub use file_impl::FileTrace;
pub use source::{MemoryTrace, TraceSource};
pub use trace::{check_ordering, load_trace, parse_line, parse_trace, write_trace};
pub use types::{tick_in_range, Sample, Tick, VehicleId, MAX_TICK};
