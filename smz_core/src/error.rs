//! Error types for the SMZ engine.

use smz_env::{Tick, VehicleId};
use thiserror::Error;

/// Errors that can occur while configuring, running or summarising a run.
#[derive(Debug, Error)]
pub enum SmzError {
    /// Run parameters are unusable (zero bucket duration, bad radius, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A mean was requested over zero vehicles
    #[error("No data: {0}")]
    NoData(&'static str),

    /// A sample carries a tick outside `[-MAX_TICK, MAX_TICK]`
    #[error("Vehicle {vehicle}: time {time} is out of range")]
    TickOutOfRange { vehicle: VehicleId, time: Tick },

    /// Writing a report failed
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SmzError {
    /// Creates an invalid configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
