//! Common types shared by the trace layer and the engine.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Discrete simulation time, in whole seconds.
pub type Tick = i64;

/// Largest tick magnitude accepted anywhere in a run (about 35,000 years).
///
/// Bucket arithmetic multiplies and adds ticks; keeping every tick and
/// duration within this bound keeps those sums far from `i64` overflow.
pub const MAX_TICK: Tick = 1 << 40;

/// Returns true if `time` lies within `[-MAX_TICK, MAX_TICK]`.
pub fn tick_in_range(time: Tick) -> bool {
    (-MAX_TICK..=MAX_TICK).contains(&time)
}

/// Identifier of a vehicle in a trace.
///
/// Always positive; id 0 never occurs in a valid trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl VehicleId {
    /// Returns the raw numeric id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed position of one vehicle at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Tick of the observation
    pub time: Tick,

    /// Observed vehicle
    pub vehicle: VehicleId,

    /// X coordinate in meters
    pub x: f64,

    /// Y coordinate in meters
    pub y: f64,
}

impl Sample {
    /// Creates a new sample.
    pub fn new(time: Tick, vehicle: u64, x: f64, y: f64) -> Self {
        Self {
            time,
            vehicle: VehicleId(vehicle),
            x,
            y,
        }
    }

    /// Compares two samples by the trace ordering key `(time, vehicle)`.
    pub fn order_key_cmp(&self, other: &Sample) -> Ordering {
        (self.time, self.vehicle).cmp(&(other.time, other.vehicle))
    }
}
