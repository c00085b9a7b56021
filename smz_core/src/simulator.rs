//! The mix zone simulator - event-driven replay of a sorted trace.
//!
//! Samples are consumed strictly in trace order. Each sample may trigger:
//! - **Entry**: the first time an unassigned vehicle is strictly inside the
//!   capture radius, it joins the group of the current time bucket
//! - **Exit**: the first time a grouped vehicle is within the edge band of
//!   the region, its anonymity statistics are frozen
//!
//! Peer scans read the positions stored in the table at the moment of the
//! exit, so a peer sampled later in the same tick still contributes its
//! previous position.

use crate::config::{GroupId, SmzConfig};
use crate::error::SmzError;
use crate::groups::GroupCounters;
use crate::vehicle::{Presence, VehicleTable};
use crate::zone::MixZone;

use geo::{EuclideanDistance, Point};
use smz_env::{tick_in_range, Sample, Tick, VehicleId};
use tracing::{debug, info, warn};

/// Statistics frozen when a vehicle leaves the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitStats {
    /// Exiting vehicle
    pub vehicle: VehicleId,

    /// Its mix zone group
    pub group: GroupId,

    /// Anonymity set size: active group peers plus the vehicle itself
    pub k: usize,

    /// Distance sum to active peers divided by `k`
    pub d_bar: f64,

    /// Time spent outside the bucket before leaving the region
    pub anon_duration: Tick,

    /// Group live counter before this vehicle left it
    pub live_count: u32,
}

/// What a single sample caused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepEvents {
    /// Group joined by this sample, if any
    pub entered: Option<GroupId>,

    /// Exit statistics computed by this sample, if any
    pub exited: Option<ExitStats>,
}

/// Final state of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Parameters of the run
    pub config: SmzConfig,

    /// Frozen per-vehicle states
    pub table: VehicleTable,

    /// Total mix zone entries (`smz_total`)
    pub smz_total: u64,

    /// Vehicles still live in a group at end of run
    pub residual_live: u64,

    /// Samples consumed
    pub samples_processed: usize,
}

/// Replays one trace for one parameter combination.
///
/// Owns its vehicle table and group counters; nothing is shared between
/// simulators, so independent runs may execute on separate threads.
pub struct MixZoneSimulator {
    config: SmzConfig,
    zone: MixZone,
    table: VehicleTable,
    groups: GroupCounters,
    samples_processed: usize,
}

impl MixZoneSimulator {
    /// Creates a simulator over a pre-sized vehicle table.
    pub fn new(config: SmzConfig, table: VehicleTable) -> Result<Self, SmzError> {
        config.validate()?;

        Ok(Self {
            zone: config.mix_zone(),
            groups: GroupCounters::with_capacity(config.expected_groups()),
            config,
            table,
            samples_processed: 0,
        })
    }

    /// Creates a simulator sized for the ids present in `samples`.
    pub fn for_samples(config: SmzConfig, samples: &[Sample]) -> Result<Self, SmzError> {
        Self::new(config, VehicleTable::from_samples(samples))
    }

    /// Returns the vehicle table.
    pub fn table(&self) -> &VehicleTable {
        &self.table
    }

    /// Returns the group counters.
    pub fn groups(&self) -> &GroupCounters {
        &self.groups
    }

    /// Consumes one sample.
    pub fn step(&mut self, sample: &Sample) -> StepEvents {
        let mut events = StepEvents::default();

        let Some(state) = self.table.get_mut(sample.vehicle) else {
            warn!(
                "Vehicle {} at t={} is outside the table's id range, sample skipped",
                sample.vehicle, sample.time
            );
            return events;
        };
        self.samples_processed += 1;

        let position = Point::new(sample.x, sample.y);
        state.observe(position);

        if state.group_id.is_none() && self.zone.captures(&position) {
            let group = self.config.group_of(sample.time);
            state.group_id = Some(group);
            state.entry_time = Some(sample.time);
            state.scheduled_group_exit_time = Some(self.config.group_exit_time(group));
            self.groups.enter(group);
            events.entered = Some(group);

            debug!("t={} vehicle {} entered mix zone, group {}", sample.time, sample.vehicle, group);
        }

        if self.config.region.near_edge(&position, self.config.edge_threshold) {
            events.exited = self.exit_region(sample.vehicle, sample.time, position);
        }

        events
    }

    /// Consumes every sample in order.
    pub fn run(&mut self, samples: &[Sample]) {
        for sample in samples {
            self.step(sample);
        }
    }

    /// Freezes the statistics of a vehicle reaching the region edge.
    ///
    /// Returns `None` if the vehicle has no group or already exited.
    fn exit_region(&mut self, vehicle: VehicleId, time: Tick, position: Point<f64>) -> Option<ExitStats> {
        let state = self.table.get(vehicle)?;
        if state.exited {
            return None;
        }
        let group = state.group_id?;
        let scheduled_exit = state
            .scheduled_group_exit_time
            .unwrap_or_else(|| self.config.group_exit_time(group));

        let live_count = self.groups.leave(group);

        let (distance_sum, peer_count) = self
            .table
            .active_peers(group, vehicle)
            .fold((0.0, 0usize), |(sum, count), (_, peer)| {
                (sum + position.euclidean_distance(&peer), count + 1)
            });

        let k = peer_count + 1;
        let d_bar = distance_sum / k as f64;
        let anon_duration = time.saturating_sub(scheduled_exit).max(0);

        let state = self.table.get_mut(vehicle)?;
        state.exited = true;
        state.region_exit_time = Some(time);
        state.k = Some(k);
        state.d_bar = d_bar;
        state.anon_duration = anon_duration;
        state.live_count_at_exit = Some(live_count);
        state.presence = Presence::Inactive;

        let span = self.config.region.width().max(self.config.region.height());
        if d_bar > span {
            warn!("Vehicle {} has d_bar {:.1}m, wider than the region", vehicle, d_bar);
        }

        debug!(
            "t={} vehicle {} left region: group={} k={} d_bar={:.2} anon={}s (live counter {})",
            time, vehicle, group, k, d_bar, anon_duration, live_count
        );

        Some(ExitStats {
            vehicle,
            group,
            k,
            d_bar,
            anon_duration,
            live_count,
        })
    }

    /// Ends the run and hands over the frozen table.
    pub fn finish(self) -> SimulationOutcome {
        SimulationOutcome {
            smz_total: self.groups.total_entries(),
            residual_live: self.groups.residual(),
            samples_processed: self.samples_processed,
            config: self.config,
            table: self.table,
        }
    }
}

/// Runs a complete simulation of `samples` under `config`.
///
/// Fails before replaying anything if a sample's tick is out of range.
pub fn simulate(config: &SmzConfig, samples: &[Sample]) -> Result<SimulationOutcome, SmzError> {
    if let Some(bad) = samples.iter().find(|s| !tick_in_range(s.time)) {
        return Err(SmzError::TickOutOfRange {
            vehicle: bad.vehicle,
            time: bad.time,
        });
    }

    let mut simulator = MixZoneSimulator::for_samples(config.clone(), samples)?;

    info!(
        "SMZ run: duration={}s radius={}m center=({}, {}) samples={} vehicles={}",
        config.bucket_duration,
        config.radius,
        config.center.0,
        config.center.1,
        samples.len(),
        simulator.table().len()
    );

    simulator.run(samples);
    let outcome = simulator.finish();

    if outcome.residual_live > 0 {
        info!(
            "{} of {} mixed vehicles never reached the region edge",
            outcome.residual_live, outcome.smz_total
        );
    }

    Ok(outcome)
}
