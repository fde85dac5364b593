//! Outpost Core -- the floorplan engine for a player base's build grid.
//!
//! This crate tracks which facilities occupy which cells of a base's 6x6
//! grid, decides whether a facility may be placed or removed, and advances
//! facilities under construction over time.
//!
//! # Update Pipeline
//!
//! Each call to [`floorplan::Floorplan::update`] does the cheap thing first:
//!
//! 1. **Accumulate** -- Add the elapsed milliseconds to a pending counter.
//! 2. **Peek** -- Compare the counter with the earliest scheduled completion.
//! 3. **Reconcile** -- Only when something is due: complete every due
//!    facility, charge the elapsed time to the rest, rebuild the schedule.
//!
//! Mutations ([`floorplan::Floorplan::add_facility`],
//! [`floorplan::Floorplan::remove_facility`]) always reconcile before acting
//! so legality and capacity bookkeeping see up-to-date facility state.
//!
//! # Key Types
//!
//! - [`floorplan::Floorplan`] -- Facilities of one base, placement and
//!   removal rules, construction progress.
//! - [`catalog::FacilityCatalog`] -- Read-only lookup of facility types,
//!   injected into every floorplan.
//! - [`ledger::CapacityLedger`] -- Available/building/in-use counters per
//!   named capacity.
//! - [`connectivity`] -- Pure neighbour and spanning-tree queries over a
//!   footprint snapshot.
//! - [`schedule::ConstructionSchedule`] -- Sorted remaining-time cache.
//! - [`serialize`] -- Versioned floorplan snapshots via bitcode.

pub mod catalog;
pub mod connectivity;
pub mod event;
pub mod facility;
pub mod floorplan;
pub mod grid;
pub mod id;
pub mod ledger;
pub mod schedule;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
