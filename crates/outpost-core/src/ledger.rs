//! Capacity bookkeeping for a base.
//!
//! Every named capacity ("STORAGE", "LIVING_SPACE", ...) carries three
//! counters. Facilities move amounts between them through the catalog
//! lifecycle callbacks:
//!
//! - start building: `building += grant`
//! - finish building: `building -= grant`, `available += grant`
//! - destroy: `available -= grant` when complete, `building -= grant` otherwise
//!
//! Game code that stores items or assigns personnel goes through
//! [`CapacityLedger::consume`] and [`CapacityLedger::release`], which never
//! let `in_use` exceed `available`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors from checked capacity operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("not enough {capacity}: requested {requested}, free {free}")]
    Insufficient {
        capacity: String,
        requested: u32,
        free: u32,
    },
    #[error("cannot release {requested} {capacity}: only {in_use} in use")]
    OverRelease {
        capacity: String,
        requested: u32,
        in_use: u32,
    },
}

/// Counters for a single named capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCounters {
    /// Granted by completed facilities.
    pub available: u32,
    /// Reserved by facilities still under construction.
    pub building: u32,
    /// Consumed out of `available`.
    pub in_use: u32,
}

impl CapacityCounters {
    /// Amount that can still be consumed.
    pub fn free(&self) -> u32 {
        self.available.saturating_sub(self.in_use)
    }
}

/// Aggregate capacity counters for one base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLedger {
    capacities: BTreeMap<String, CapacityCounters>,
}

impl CapacityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger with zeroed counters for each of the given capacity names.
    pub fn with_capacities<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            capacities: names
                .into_iter()
                .map(|name| (name.into(), CapacityCounters::default()))
                .collect(),
        }
    }

    /// Counters for a capacity. Unknown names read as all zeros.
    pub fn get(&self, capacity: &str) -> CapacityCounters {
        self.capacities.get(capacity).copied().unwrap_or_default()
    }

    pub fn available(&self, capacity: &str) -> u32 {
        self.get(capacity).available
    }

    pub fn building(&self, capacity: &str) -> u32 {
        self.get(capacity).building
    }

    pub fn in_use(&self, capacity: &str) -> u32 {
        self.get(capacity).in_use
    }

    /// Iterate over all known capacities in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapacityCounters)> {
        self.capacities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume `amount` of a capacity. Fails without changing anything if
    /// less than `amount` is free.
    pub fn consume(&mut self, capacity: &str, amount: u32) -> Result<(), CapacityError> {
        let free = self.get(capacity).free();
        if amount > free {
            return Err(CapacityError::Insufficient {
                capacity: capacity.to_string(),
                requested: amount,
                free,
            });
        }
        self.entry(capacity).in_use += amount;
        Ok(())
    }

    /// Give back `amount` of a previously consumed capacity.
    pub fn release(&mut self, capacity: &str, amount: u32) -> Result<(), CapacityError> {
        let in_use = self.in_use(capacity);
        if amount > in_use {
            return Err(CapacityError::OverRelease {
                capacity: capacity.to_string(),
                requested: amount,
                in_use,
            });
        }
        self.entry(capacity).in_use -= amount;
        Ok(())
    }

    // -- Lifecycle moves (driven by facility type callbacks) --

    pub(crate) fn begin_building(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.building = counters.building.saturating_add(amount);
    }

    pub(crate) fn finish_building(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.building = counters.building.saturating_sub(amount);
        counters.available = counters.available.saturating_add(amount);
    }

    pub(crate) fn cancel_building(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.building = counters.building.saturating_sub(amount);
    }

    pub(crate) fn withdraw(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.available = counters.available.saturating_sub(amount);
    }

    pub(crate) fn occupy(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.in_use = counters.in_use.saturating_add(amount);
    }

    pub(crate) fn vacate(&mut self, capacity: &str, amount: u32) {
        let counters = self.entry(capacity);
        counters.in_use = counters.in_use.saturating_sub(amount);
    }

    fn entry(&mut self, capacity: &str) -> &mut CapacityCounters {
        self.capacities.entry(capacity.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_capacity_reads_zero() {
        let ledger = CapacityLedger::new();
        assert_eq!(ledger.get("STORAGE"), CapacityCounters::default());
        assert_eq!(ledger.iter().count(), 0);
    }

    #[test]
    fn with_capacities_seeds_names() {
        let ledger = CapacityLedger::with_capacities(["STORAGE", "HANGAR"]);
        let names: Vec<_> = ledger.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["HANGAR", "STORAGE"]);
    }

    #[test]
    fn building_then_finishing_moves_to_available() {
        let mut ledger = CapacityLedger::new();
        ledger.begin_building("STORAGE", 500);
        assert_eq!(ledger.building("STORAGE"), 500);
        assert_eq!(ledger.available("STORAGE"), 0);

        ledger.finish_building("STORAGE", 500);
        assert_eq!(ledger.building("STORAGE"), 0);
        assert_eq!(ledger.available("STORAGE"), 500);
    }

    #[test]
    fn consume_respects_free_amount() {
        let mut ledger = CapacityLedger::new();
        ledger.begin_building("STORAGE", 100);
        ledger.finish_building("STORAGE", 100);

        ledger.consume("STORAGE", 60).unwrap();
        assert_eq!(ledger.in_use("STORAGE"), 60);

        let err = ledger.consume("STORAGE", 41).unwrap_err();
        assert_eq!(
            err,
            CapacityError::Insufficient {
                capacity: "STORAGE".to_string(),
                requested: 41,
                free: 40,
            }
        );
        assert_eq!(ledger.in_use("STORAGE"), 60);
    }

    #[test]
    fn release_cannot_go_negative() {
        let mut ledger = CapacityLedger::new();
        ledger.begin_building("STORAGE", 10);
        ledger.finish_building("STORAGE", 10);
        ledger.consume("STORAGE", 5).unwrap();

        assert!(matches!(
            ledger.release("STORAGE", 6),
            Err(CapacityError::OverRelease { in_use: 5, .. })
        ));
        ledger.release("STORAGE", 5).unwrap();
        assert_eq!(ledger.in_use("STORAGE"), 0);
    }

    #[test]
    fn lifecycle_moves_saturate() {
        let mut ledger = CapacityLedger::new();
        ledger.cancel_building("STORAGE", 10);
        ledger.withdraw("STORAGE", 10);
        ledger.vacate("STORAGE", 10);
        assert_eq!(ledger.get("STORAGE"), CapacityCounters::default());
    }

    #[test]
    fn error_display_messages() {
        let e = CapacityError::Insufficient {
            capacity: "STORAGE".to_string(),
            requested: 10,
            free: 3,
        };
        let msg = format!("{e}");
        assert!(msg.contains("STORAGE"));
        assert!(msg.contains("10"));
        assert!(msg.contains('3'));
    }
}
