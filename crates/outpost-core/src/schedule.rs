//! Sorted cache of facilities under construction.
//!
//! Keys are remaining build seconds, values the facility that owns them.
//! The smallest key is the next facility due to complete, which lets the
//! floorplan skip a full scan on ticks where nothing finishes.
//!
//! Keys are unique. Two facilities with the same remaining time cannot share
//! a key, so the later one is moved down by whole seconds until it fits:
//! it will be treated as finishing up to a few seconds early.

use crate::id::FacilityId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructionSchedule {
    /// Ascending by key.
    entries: Vec<(f64, FacilityId)>,
}

impl ConstructionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a facility. Returns the key actually used.
    pub fn insert(&mut self, remaining_seconds: f64, facility: FacilityId) -> f64 {
        let mut key = remaining_seconds;
        while self.contains_key(key) {
            key -= 1.0;
        }
        if key != remaining_seconds {
            log::warn!(
                "schedule key {remaining_seconds} taken, {facility:?} scheduled at {key}"
            );
        }
        let at = self.entries.partition_point(|(k, _)| *k < key);
        self.entries.insert(at, (key, facility));
        key
    }

    pub fn contains_key(&self, key: f64) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn contains(&self, facility: FacilityId) -> bool {
        self.entries.iter().any(|(_, f)| *f == facility)
    }

    /// Key of the facility closest to completion.
    pub fn next_due(&self) -> Option<f64> {
        self.entries.first().map(|(k, _)| *k)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, FacilityId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
