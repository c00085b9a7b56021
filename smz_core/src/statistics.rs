//! Aggregation of per-vehicle results into run summaries.

use crate::error::SmzError;
use crate::simulator::SimulationOutcome;
use crate::vehicle::VehicleState;
use serde::{Deserialize, Serialize};
use smz_env::Tick;
use tracing::debug;

/// Running sums of `(k, d_bar, anon_duration)` over a set of vehicles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KdaSums {
    /// Sum of reported anonymity set sizes
    pub k: u64,

    /// Sum of mean peer distances
    pub d_bar: f64,

    /// Sum of anonymity durations
    pub anon_duration: Tick,

    /// Number of vehicles summed
    pub count: usize,
}

impl KdaSums {
    /// Adds one vehicle's reported results.
    pub fn add(&mut self, state: &VehicleState) {
        self.k = self.k.saturating_add(state.reported_k() as u64);
        self.d_bar += state.d_bar;
        self.anon_duration = self.anon_duration.saturating_add(state.anon_duration);
        self.count += 1;
    }

    /// Means over the summed vehicles.
    ///
    /// Fails with [`SmzError::NoData`] when no vehicle was summed.
    pub fn means(&self, what: &'static str) -> Result<KdaMeans, SmzError> {
        if self.count == 0 {
            return Err(SmzError::NoData(what));
        }
        let n = self.count as f64;

        Ok(KdaMeans {
            k: self.k as f64 / n,
            d_bar: self.d_bar / n,
            anon_duration: self.anon_duration as f64 / n,
            count: self.count,
        })
    }
}

/// Mean `(k, d_bar, anon_duration)` and the number of vehicles behind them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdaMeans {
    pub k: f64,
    pub d_bar: f64,
    pub anon_duration: f64,
    pub count: usize,
}

/// Summary of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateSummary {
    /// All vehicles in the id range
    pub system: KdaSums,

    /// Vehicles with a reported `k > 1`
    pub anonymized: KdaSums,

    /// Total mix zone entries
    pub smz_total: u64,

    /// Vehicles still live in a group at end of run
    pub residual_live: u64,
}

impl AggregateSummary {
    /// System-wide means over all vehicles.
    pub fn system_means(&self) -> Result<KdaMeans, SmzError> {
        self.system.means("no vehicles observed")
    }

    /// Means over anonymized vehicles only.
    pub fn anonymized_means(&self) -> Result<KdaMeans, SmzError> {
        self.anonymized.means("no anonymized vehicles")
    }

    /// Returns true if every mix zone entry produced an anonymized vehicle.
    ///
    /// Vehicles that entered alone, or never reached the edge, make this
    /// false; the figure is a cross-check, not a failure.
    pub fn entries_consistent(&self) -> bool {
        self.anonymized.count as u64 == self.smz_total
    }
}

/// Accumulates vehicle results into system-wide and anonymized-only sums.
#[derive(Debug, Default)]
pub struct StatisticsAggregator {
    system: KdaSums,
    anonymized: KdaSums,
}

impl StatisticsAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one vehicle.
    pub fn record(&mut self, state: &VehicleState) {
        self.system.add(state);
        if state.is_anonymized() {
            self.anonymized.add(state);
        }
    }

    /// Finalizes the summary with the run-level counters.
    pub fn finish(self, smz_total: u64, residual_live: u64) -> AggregateSummary {
        AggregateSummary {
            system: self.system,
            anonymized: self.anonymized,
            smz_total,
            residual_live,
        }
    }
}

/// Aggregates every vehicle of a finished run.
pub fn aggregate(outcome: &SimulationOutcome) -> AggregateSummary {
    let mut aggregator = StatisticsAggregator::new();
    for state in outcome.table.iter() {
        aggregator.record(state);
    }
    let summary = aggregator.finish(outcome.smz_total, outcome.residual_live);

    if !summary.entries_consistent() {
        debug!(
            "{} anonymized vehicles for {} mix zone entries",
            summary.anonymized.count, summary.smz_total
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use smz_env::VehicleId;

    fn vehicle(id: u64, k: Option<usize>, d_bar: f64, anon: Tick) -> VehicleState {
        let mut state = VehicleState::new(VehicleId(id));
        state.k = k;
        state.d_bar = d_bar;
        state.anon_duration = anon;
        state
    }

    #[test]
    fn test_system_and_anonymized_means() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.record(&vehicle(1, Some(3), 12.0, 40));
        aggregator.record(&vehicle(2, Some(1), 0.0, 0));
        aggregator.record(&vehicle(3, None, 0.0, 0));
        aggregator.record(&vehicle(4, Some(2), 6.0, 10));

        let summary = aggregator.finish(2, 0);
        let system = summary.system_means().unwrap();
        let anonymized = summary.anonymized_means().unwrap();

        assert_eq!(system.count, 4);
        assert_relative_eq!(system.k, 7.0 / 4.0);
        assert_relative_eq!(system.d_bar, 18.0 / 4.0);
        assert_relative_eq!(system.anon_duration, 50.0 / 4.0);

        assert_eq!(anonymized.count, 2);
        assert_relative_eq!(anonymized.k, 2.5);
        assert_relative_eq!(anonymized.d_bar, 9.0);
        assert_relative_eq!(anonymized.anon_duration, 25.0);
        assert!(summary.entries_consistent());
    }

    #[test]
    fn test_unset_k_is_floored() {
        let mut sums = KdaSums::default();
        sums.add(&vehicle(1, Some(0), 0.0, 0));
        sums.add(&vehicle(2, None, 0.0, 0));

        assert_eq!(sums.k, 2);
    }

    #[test]
    fn test_anon_duration_sum_saturates() {
        let mut sums = KdaSums::default();
        sums.add(&vehicle(1, Some(2), 0.0, i64::MAX));
        sums.add(&vehicle(2, Some(2), 0.0, 5));

        assert_eq!(sums.anon_duration, i64::MAX);
        assert_eq!(sums.count, 2);
    }

    #[test]
    fn test_empty_run_reports_no_data() {
        let summary = StatisticsAggregator::new().finish(0, 0);

        assert!(matches!(summary.system_means(), Err(SmzError::NoData(_))));
        assert!(matches!(summary.anonymized_means(), Err(SmzError::NoData(_))));
    }

    #[test]
    fn test_no_anonymized_vehicles() {
        let mut aggregator = StatisticsAggregator::new();
        aggregator.record(&vehicle(1, Some(1), 0.0, 0));
        let summary = aggregator.finish(1, 0);

        assert_eq!(summary.system_means().unwrap().k, 1.0);
        assert!(summary.anonymized_means().is_err());
        assert!(!summary.entries_consistent());
    }
}
