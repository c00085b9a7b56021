//! Run configuration for the mix zone simulator.

use crate::error::SmzError;
use crate::zone::{MixZone, Region, DEFAULT_EDGE_THRESHOLD};
use smz_env::{Tick, MAX_TICK};

/// Mix zone group identifier: `floor(time / bucket_duration)`.
pub type GroupId = i64;

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SmzConfig {
    /// Length of a mix zone time bucket in seconds
    pub bucket_duration: Tick,

    /// Mix zone capture radius in meters
    pub radius: f64,

    /// Mix zone center (x, y) in meters
    pub center: (f64, f64),

    /// Bounded simulation area
    pub region: Region,

    /// Distance from an edge counted as leaving the region (meters)
    pub edge_threshold: f64,

    /// Total simulated time, used only to pre-size group counters
    pub total_sim_time: Tick,
}

impl Default for SmzConfig {
    fn default() -> Self {
        Self {
            bucket_duration: 50,
            radius: 50.0,
            center: (2290.0, 800.0),
            region: Region::default(),
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            total_sim_time: 2000,
        }
    }
}

impl SmzConfig {
    /// Creates a configuration for the given bucket duration, radius and center.
    pub fn new(bucket_duration: Tick, radius: f64, center: (f64, f64)) -> Self {
        Self {
            bucket_duration,
            radius,
            center,
            ..Default::default()
        }
    }

    /// Sets the bucket duration.
    pub fn with_bucket_duration(mut self, secs: Tick) -> Self {
        self.bucket_duration = secs;
        self
    }

    /// Sets the capture radius.
    pub fn with_radius(mut self, meters: f64) -> Self {
        self.radius = meters;
        self
    }

    /// Sets the mix zone center.
    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center = (x, y);
        self
    }

    /// Sets the simulation region.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Sets the edge threshold.
    pub fn with_edge_threshold(mut self, meters: f64) -> Self {
        self.edge_threshold = meters;
        self
    }

    /// Sets the total simulated time.
    pub fn with_total_sim_time(mut self, secs: Tick) -> Self {
        self.total_sim_time = secs;
        self
    }

    /// Checks that the parameters describe a runnable simulation.
    pub fn validate(&self) -> Result<(), SmzError> {
        if self.bucket_duration <= 0 {
            return Err(SmzError::config(format!(
                "bucket duration must be positive, got {}",
                self.bucket_duration
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SmzError::config(format!(
                "radius must be a positive number of meters, got {}",
                self.radius
            )));
        }
        if !self.center.0.is_finite() || !self.center.1.is_finite() {
            return Err(SmzError::config("mix zone center must be finite"));
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(SmzError::config(format!(
                "edge threshold must be non-negative, got {}",
                self.edge_threshold
            )));
        }
        if !(self.region.width() > 0.0 && self.region.height() > 0.0) {
            return Err(SmzError::config("simulation region is degenerate"));
        }
        if self.bucket_duration > MAX_TICK {
            return Err(SmzError::config(format!(
                "bucket duration must not exceed {}s, got {}",
                MAX_TICK, self.bucket_duration
            )));
        }
        if !(0..=MAX_TICK).contains(&self.total_sim_time) {
            return Err(SmzError::config(format!(
                "total simulation time must be within 0..={}, got {}",
                MAX_TICK,
                self.total_sim_time
            )));
        }
        Ok(())
    }

    /// Returns the mix zone described by this configuration.
    pub fn mix_zone(&self) -> MixZone {
        MixZone::new(self.center.0, self.center.1, self.radius)
    }

    /// Returns the group a vehicle entering at `time` joins.
    pub fn group_of(&self, time: Tick) -> GroupId {
        time.div_euclid(self.bucket_duration)
    }

    /// Returns the deterministic end of a group's time bucket.
    ///
    /// Saturates at the `i64` limits for groups beyond any valid tick.
    pub fn group_exit_time(&self, group: GroupId) -> Tick {
        group.saturating_add(1).saturating_mul(self.bucket_duration)
    }

    /// Number of group counters to reserve up front.
    pub fn expected_groups(&self) -> usize {
        (self.total_sim_time / self.bucket_duration.max(1)) as usize + 2
    }
}
