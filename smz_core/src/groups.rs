//! Live membership counters for mix zone groups.

use crate::config::GroupId;
use std::collections::HashMap;

/// Number of vehicles currently assigned to each group and not yet exited.
#[derive(Debug, Clone, Default)]
pub struct GroupCounters {
    live: HashMap<GroupId, u32>,

    /// Total mix zone entries over the run (`smz_total`)
    entries: u64,
}

impl GroupCounters {
    /// Creates counters with room for `groups` buckets.
    pub fn with_capacity(groups: usize) -> Self {
        Self {
            live: HashMap::with_capacity(groups),
            entries: 0,
        }
    }

    /// Registers a vehicle joining `group`.
    pub fn enter(&mut self, group: GroupId) {
        *self.live.entry(group).or_insert(0) += 1;
        self.entries += 1;
    }

    /// Registers a vehicle leaving `group`; returns the count before leaving.
    pub fn leave(&mut self, group: GroupId) -> u32 {
        let count = self.live.entry(group).or_insert(0);
        let before = *count;
        *count = count.saturating_sub(1);
        before
    }

    /// Vehicles currently live in `group`.
    pub fn live(&self, group: GroupId) -> u32 {
        self.live.get(&group).copied().unwrap_or(0)
    }

    /// Total mix zone entries so far.
    pub fn total_entries(&self) -> u64 {
        self.entries
    }

    /// Vehicles that entered some group and have not exited.
    pub fn residual(&self) -> u64 {
        self.live.values().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave() {
        let mut groups = GroupCounters::with_capacity(4);
        groups.enter(0);
        groups.enter(0);
        groups.enter(3);

        assert_eq!(groups.live(0), 2);
        assert_eq!(groups.leave(0), 2);
        assert_eq!(groups.live(0), 1);
        assert_eq!(groups.total_entries(), 3);
        assert_eq!(groups.residual(), 2);
    }

    #[test]
    fn test_leave_never_underflows() {
        let mut groups = GroupCounters::default();

        assert_eq!(groups.leave(7), 0);
        assert_eq!(groups.live(7), 0);
    }

    #[test]
    fn test_group_beyond_capacity() {
        let mut groups = GroupCounters::with_capacity(2);
        groups.enter(500);

        assert_eq!(groups.live(500), 1);
    }
}
