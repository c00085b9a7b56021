//! Per-vehicle simulation state and the dense table that owns it.

use crate::config::GroupId;
use geo::Point;
use smz_env::{Sample, Tick, VehicleId};

/// Where a vehicle currently is, as far as peer scans are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Presence {
    /// No sample seen yet
    #[default]
    Unseen,

    /// Most recent known position
    Active(Point<f64>),

    /// Exit processed; no longer a peer for anyone
    Inactive,
}

impl Presence {
    /// Returns the position if the vehicle is still active.
    pub fn active(&self) -> Option<Point<f64>> {
        match self {
            Presence::Active(p) => Some(*p),
            _ => None,
        }
    }
}

/// Mutable state of one vehicle during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Vehicle id
    pub id: VehicleId,

    /// Mix zone group, assigned at most once
    pub group_id: Option<GroupId>,

    /// Current position used by peer scans
    pub presence: Presence,

    /// First observed position
    pub first_position: Option<Point<f64>>,

    /// Most recent observed position (kept after exit)
    pub last_position: Option<Point<f64>>,

    /// Tick at which the vehicle joined the mix zone
    pub entry_time: Option<Tick>,

    /// End of the vehicle's mix zone bucket
    pub scheduled_group_exit_time: Option<Tick>,

    /// Tick at which the vehicle was judged to leave the region
    pub region_exit_time: Option<Tick>,

    /// Exit statistics already computed
    pub exited: bool,

    /// Anonymity set size at exit (peer scan)
    pub k: Option<usize>,

    /// Mean distance to active group peers at exit
    pub d_bar: f64,

    /// Seconds between bucket end and region exit
    pub anon_duration: Tick,

    /// Live group counter read at exit, before decrementing (diagnostic)
    pub live_count_at_exit: Option<u32>,
}

impl VehicleState {
    /// Creates a fresh state with all results unset.
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            group_id: None,
            presence: Presence::Unseen,
            first_position: None,
            last_position: None,
            entry_time: None,
            scheduled_group_exit_time: None,
            region_exit_time: None,
            exited: false,
            k: None,
            d_bar: 0.0,
            anon_duration: 0,
            live_count_at_exit: None,
        }
    }

    /// Records an observed position.
    ///
    /// An exited vehicle keeps its bookkeeping up to date but stays
    /// inactive for peer scans.
    pub fn observe(&mut self, position: Point<f64>) {
        if self.first_position.is_none() {
            self.first_position = Some(position);
        }
        self.last_position = Some(position);
        if !self.exited {
            self.presence = Presence::Active(position);
        }
    }

    /// Anonymity set size as reported: never below 1.
    pub fn reported_k(&self) -> usize {
        self.k.map_or(1, |k| k.max(1))
    }

    /// Returns true if the vehicle was mixed with at least one peer.
    pub fn is_anonymized(&self) -> bool {
        self.reported_k() > 1
    }

    /// Returns true if the vehicle entered the mix zone.
    pub fn has_group(&self) -> bool {
        self.group_id.is_some()
    }
}

/// Dense table of vehicle states indexed by id.
///
/// Sized once from the observed id range; ids in the range that never
/// appear keep default state and still take part in aggregation.
#[derive(Debug, Clone, Default)]
pub struct VehicleTable {
    base: u64,
    states: Vec<VehicleState>,
}

impl VehicleTable {
    /// Creates a table covering `min..=max`.
    pub fn with_id_range(min: VehicleId, max: VehicleId) -> Self {
        let (lo, hi) = if min <= max { (min.0, max.0) } else { (max.0, min.0) };
        Self {
            base: lo,
            states: (lo..=hi).map(|id| VehicleState::new(VehicleId(id))).collect(),
        }
    }

    /// Creates a table covering every id seen in `samples`.
    ///
    /// Returns an empty table for an empty trace.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let min = samples.iter().map(|s| s.vehicle).min();
        let max = samples.iter().map(|s| s.vehicle).max();

        match (min, max) {
            (Some(min), Some(max)) => Self::with_id_range(min, max),
            _ => Self::default(),
        }
    }

    fn index(&self, id: VehicleId) -> Option<usize> {
        let offset = id.0.checked_sub(self.base)?;
        let index = usize::try_from(offset).ok()?;
        (index < self.states.len()).then_some(index)
    }

    /// Returns the state of a vehicle.
    pub fn get(&self, id: VehicleId) -> Option<&VehicleState> {
        let index = self.index(id)?;
        Some(&self.states[index])
    }

    /// Returns the mutable state of a vehicle.
    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut VehicleState> {
        let index = self.index(id)?;
        Some(&mut self.states[index])
    }

    /// Iterates over all states in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleState> {
        self.states.iter()
    }

    /// Number of ids covered.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if the table covers no ids.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Smallest covered id.
    pub fn min_id(&self) -> Option<VehicleId> {
        self.states.first().map(|s| s.id)
    }

    /// Largest covered id.
    pub fn max_id(&self) -> Option<VehicleId> {
        self.states.last().map(|s| s.id)
    }

    /// Active members of `group`, excluding `exclude`, with their positions.
    pub fn active_peers(
        &self,
        group: GroupId,
        exclude: VehicleId,
    ) -> impl Iterator<Item = (VehicleId, Point<f64>)> + '_ {
        self.states.iter().filter_map(move |s| {
            if s.id == exclude || s.group_id != Some(group) {
                return None;
            }
            s.presence.active().map(|p| (s.id, p))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_id_range() {
        let samples = vec![Sample::new(0, 4, 0.0, 0.0), Sample::new(0, 7, 0.0, 0.0)];
        let table = VehicleTable::from_samples(&samples);

        assert_eq!(table.len(), 4);
        assert_eq!(table.min_id(), Some(VehicleId(4)));
        assert_eq!(table.max_id(), Some(VehicleId(7)));
        assert!(table.get(VehicleId(5)).is_some());
        assert!(table.get(VehicleId(3)).is_none());
        assert!(table.get(VehicleId(8)).is_none());
    }

    #[test]
    fn test_empty_trace_gives_empty_table() {
        let table = VehicleTable::from_samples(&[]);

        assert!(table.is_empty());
        assert_eq!(table.min_id(), None);
    }

    #[test]
    fn test_reported_k_floor() {
        let mut state = VehicleState::new(VehicleId(1));
        assert_eq!(state.reported_k(), 1);

        state.k = Some(0);
        assert_eq!(state.reported_k(), 1);

        state.k = Some(3);
        assert_eq!(state.reported_k(), 3);
        assert!(state.is_anonymized());
    }

    #[test]
    fn test_observe_after_exit_stays_inactive() {
        let mut state = VehicleState::new(VehicleId(1));
        state.observe(Point::new(1.0, 2.0));
        assert_eq!(state.presence, Presence::Active(Point::new(1.0, 2.0)));

        state.exited = true;
        state.presence = Presence::Inactive;
        state.observe(Point::new(5.0, 6.0));

        assert_eq!(state.presence, Presence::Inactive);
        assert_eq!(state.first_position, Some(Point::new(1.0, 2.0)));
        assert_eq!(state.last_position, Some(Point::new(5.0, 6.0)));
    }

    #[test]
    fn test_active_peers_filter() {
        let mut table = VehicleTable::with_id_range(VehicleId(1), VehicleId(4));
        for (id, group) in [(1, Some(0)), (2, Some(0)), (3, Some(1)), (4, Some(0))] {
            let state = table.get_mut(VehicleId(id)).unwrap();
            state.group_id = group;
            state.observe(Point::new(id as f64, 0.0));
        }
        table.get_mut(VehicleId(4)).unwrap().presence = Presence::Inactive;

        let peers: Vec<VehicleId> = table.active_peers(0, VehicleId(1)).map(|(id, _)| id).collect();
        assert_eq!(peers, vec![VehicleId(2)]);
    }
}
