//! The floorplan of one base: which facilities sit where, whether a new one
//! may be placed or an old one removed, and construction progress.
//!
//! # Legality vs. contracts
//!
//! [`Floorplan::is_position_legal`] and [`Floorplan::can_remove`] return
//! expected, player-facing outcomes as values. The mutations trust their
//! callers: adding an illegal candidate, or passing a facility id that is not
//! on this floorplan, panics.
//!
//! # Construction schedule
//!
//! Facilities under construction are kept in a [`ConstructionSchedule`]
//! ordered by remaining time. [`Floorplan::update`] only accumulates elapsed
//! time until the earliest entry is due; then it reconciles every facility at
//! once and rebuilds the schedule. Mutations reconcile first, so they never
//! see a facility that should already have finished.

use crate::catalog::{FacilityCatalog, FacilityType};
use crate::connectivity::{self, PlacedFootprint};
use crate::event::FloorplanEvent;
use crate::facility::FacilityInstance;
use crate::grid::GridPosition;
use crate::id::{FacilityId, FacilityTypeId};
use crate::ledger::CapacityLedger;
use crate::schedule::ConstructionSchedule;
use slotmap::SlotMap;
use std::sync::Arc;

pub use crate::grid::{CELLS_HIGH, CELLS_WIDE};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a candidate facility cannot be placed where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("facility does not fit inside the base")]
    OutOfBounds,
    #[error("facility overlaps an existing facility")]
    CellOccupied,
    #[error("facility must be next to a completed facility")]
    NoCompletedNeighbor,
}

/// Why a facility cannot be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RemovalError {
    #[error("capacity granted by the facility is in use")]
    InUse,
    #[error("removing the facility would split the base")]
    WouldDisconnectBase,
}

// ---------------------------------------------------------------------------
// Floorplan
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Floorplan {
    pub(crate) catalog: Arc<dyn FacilityCatalog>,
    pub(crate) facilities: SlotMap<FacilityId, FacilityInstance>,
    /// Placement order. The first entry is the access lift.
    pub(crate) order: Vec<FacilityId>,
    pub(crate) schedule: ConstructionSchedule,
    /// Seconds elapsed since the schedule was last reconciled.
    pub(crate) elapsed: f64,
    pub(crate) ledger: CapacityLedger,
    pub(crate) events: Vec<FloorplanEvent>,
}

impl Floorplan {
    /// An empty floorplan with an empty capacity ledger.
    pub fn new(catalog: Arc<dyn FacilityCatalog>) -> Self {
        Self::with_ledger(catalog, CapacityLedger::new())
    }

    pub fn with_ledger(catalog: Arc<dyn FacilityCatalog>, ledger: CapacityLedger) -> Self {
        Self {
            catalog,
            facilities: SlotMap::with_key(),
            order: Vec::new(),
            schedule: ConstructionSchedule::new(),
            elapsed: 0.0,
            ledger,
            events: Vec::new(),
        }
    }

    // -- Read access --

    pub fn catalog(&self) -> &dyn FacilityCatalog {
        self.catalog.as_ref()
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    /// Mutable ledger access for game code consuming or releasing capacity.
    pub fn ledger_mut(&mut self) -> &mut CapacityLedger {
        &mut self.ledger
    }

    pub fn get(&self, id: FacilityId) -> Option<&FacilityInstance> {
        self.facilities.get(id)
    }

    /// Facility ids in placement order.
    pub fn ids(&self) -> &[FacilityId] {
        &self.order
    }

    /// Facilities in placement order.
    pub fn facilities(&self) -> impl Iterator<Item = (FacilityId, &FacilityInstance)> {
        self.order.iter().map(|&id| (id, &self.facilities[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_base_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The first facility placed, which anchors connectivity.
    pub fn access_lift(&self) -> Option<FacilityId> {
        self.order.first().copied()
    }

    pub fn schedule(&self) -> &ConstructionSchedule {
        &self.schedule
    }

    /// Seconds accumulated by [`Floorplan::update`] but not yet charged to
    /// facilities.
    pub fn pending_elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<FloorplanEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Identity queries --

    /// The facility covering cell `(x, y)`, if any.
    pub fn facility_at(&self, x: i32, y: i32) -> Option<FacilityId> {
        let cell = GridPosition::new(x, y);
        self.order.iter().copied().find(|&id| {
            let facility = &self.facilities[id];
            self.facility_type(facility.type_id())
                .footprint()
                .contains(facility.position(), cell)
        })
    }

    /// The single facility of a base-unique type.
    ///
    /// # Panics
    ///
    /// If the type is not marked base-unique in the catalog.
    pub fn find_unique_facility(&self, type_id: FacilityTypeId) -> Option<FacilityId> {
        let ty = self.facility_type(type_id);
        assert!(
            ty.is_base_unique(),
            "find_unique_facility called for '{}', which is not base-unique",
            ty.name()
        );
        self.order
            .iter()
            .copied()
            .find(|&id| self.facilities[id].type_id() == type_id)
    }

    /// Whether at least one facility of the type is on the base.
    pub fn contains_type(&self, type_id: FacilityTypeId) -> bool {
        self.facilities().any(|(_, f)| f.type_id() == type_id)
    }

    /// Facilities sharing an edge with `id`.
    pub fn neighbours(&self, id: FacilityId, include_under_construction: bool) -> Vec<FacilityId> {
        let index = self.index_of(id);
        connectivity::neighbours(&self.placed_footprints(), index, include_under_construction)
            .into_iter()
            .map(|i| self.order[i])
            .collect()
    }

    // -- Legality --

    /// Check a candidate against bounds, then occupancy, then adjacency to a
    /// completed facility. Stops at the first failure.
    ///
    /// The access lift placed on an empty base needs no neighbour.
    pub fn is_position_legal(&self, candidate: &FacilityInstance) -> Result<(), PlacementError> {
        let ty = self.facility_type(candidate.type_id());
        let footprint = ty.footprint();
        let origin = candidate.position();

        if !footprint.fits_grid(origin) {
            return Err(PlacementError::OutOfBounds);
        }

        let snapshot = self.placed_footprints();
        if footprint
            .cells(origin)
            .any(|cell| connectivity::facility_at(&snapshot, cell).is_some())
        {
            return Err(PlacementError::CellOccupied);
        }

        if self.is_base_empty() && ty.is_access_lift() {
            return Ok(());
        }

        if connectivity::neighbours_of(&snapshot, origin, footprint, None, false).is_empty() {
            return Err(PlacementError::NoCompletedNeighbor);
        }
        Ok(())
    }

    /// Check whether a facility may be removed: its granted capacity must not
    /// be in use, and the rest of the base must stay attached to the lift.
    pub fn can_remove(&self, id: FacilityId) -> Result<(), RemovalError> {
        let index = self.index_of(id);
        let facility = &self.facilities[id];

        if !facility.is_under_construction() {
            let ty = self.facility_type(facility.type_id());
            let in_use = ty.grants().iter().any(|grant| {
                let counters = self.ledger.get(&grant.capacity);
                counters.available.saturating_sub(grant.amount) < counters.in_use
            });
            if in_use {
                return Err(RemovalError::InUse);
            }
        }

        if connectivity::would_disconnect(&self.placed_footprints(), index) {
            return Err(RemovalError::WouldDisconnectBase);
        }
        Ok(())
    }

    // -- Mutation --

    /// Place a facility and start building it.
    ///
    /// # Panics
    ///
    /// If the candidate fails [`Floorplan::is_position_legal`].
    pub fn add_facility(&mut self, candidate: FacilityInstance) -> FacilityId {
        self.reconcile();

        if let Err(err) = self.is_position_legal(&candidate) {
            panic!(
                "add_facility called with an illegal placement at {:?}: {err}",
                candidate.position()
            );
        }

        let catalog = Arc::clone(&self.catalog);
        let ty = lookup(catalog.as_ref(), candidate.type_id());
        let type_id = candidate.type_id();
        let position = candidate.position();
        let duration = ty.build_duration_seconds();

        let id = self.facilities.insert(candidate);
        self.order.push(id);
        self.events.push(FloorplanEvent::FacilityAdded {
            facility: id,
            type_id,
            position,
        });

        ty.on_start_building(&mut self.ledger);
        if duration > 0.0 {
            self.facilities[id].start_construction(duration);
            self.schedule.insert(duration, id);
            log::debug!(
                "placed '{}' at ({}, {}), {duration}s to build",
                ty.name(),
                position.x,
                position.y
            );
        } else {
            self.facilities[id].complete();
            ty.on_finished_building(&mut self.ledger);
            self.events
                .push(FloorplanEvent::ConstructionCompleted { facility: id, type_id });
            log::debug!(
                "placed '{}' at ({}, {}), built instantly",
                ty.name(),
                position.x,
                position.y
            );
        }
        id
    }

    /// Remove a facility, releasing its capacity if it was complete.
    ///
    /// # Panics
    ///
    /// If `id` is not on this floorplan.
    pub fn remove_facility(&mut self, id: FacilityId) -> FacilityInstance {
        self.reconcile();

        let index = self.index_of(id);
        self.order.remove(index);
        let Some(facility) = self.facilities.remove(id) else {
            unreachable!("facility order and storage disagree about {id:?}");
        };

        let was_complete = !facility.is_under_construction();
        let catalog = Arc::clone(&self.catalog);
        let ty = lookup(catalog.as_ref(), facility.type_id());
        ty.on_destroy(&mut self.ledger, was_complete);
        self.rebuild_schedule();

        self.events.push(FloorplanEvent::FacilityRemoved {
            facility: id,
            type_id: facility.type_id(),
            was_complete,
        });
        log::debug!(
            "removed '{}' from ({}, {}), complete: {was_complete}",
            ty.name(),
            facility.x(),
            facility.y()
        );
        facility
    }

    // -- Time advance --

    /// Advance construction by `elapsed_ms` milliseconds.
    pub fn update(&mut self, elapsed_ms: u64) {
        self.elapsed += elapsed_ms as f64 / 1000.0;
        match self.schedule.next_due() {
            Some(next) if next <= self.elapsed => self.reconcile(),
            _ => {}
        }
    }

    /// Charge all accumulated time to the scheduled facilities, completing
    /// every one whose key has been reached, then rebuild the schedule.
    fn reconcile(&mut self) {
        if self.elapsed <= 0.0 {
            return;
        }
        let elapsed = std::mem::take(&mut self.elapsed);
        let catalog = Arc::clone(&self.catalog);

        let entries: Vec<(f64, FacilityId)> = self.schedule.iter().collect();
        for (key, id) in entries {
            let facility = &mut self.facilities[id];
            if key <= elapsed {
                facility.complete();
                let ty = lookup(catalog.as_ref(), facility.type_id());
                ty.on_finished_building(&mut self.ledger);
                self.events.push(FloorplanEvent::ConstructionCompleted {
                    facility: id,
                    type_id: facility.type_id(),
                });
                log::info!(
                    "'{}' at ({}, {}) finished construction",
                    ty.name(),
                    facility.x(),
                    facility.y()
                );
            } else {
                facility.advance(elapsed);
            }
        }
        self.rebuild_schedule();
    }

    /// Rebuild the schedule from facility state, in placement order.
    pub(crate) fn rebuild_schedule(&mut self) {
        self.schedule.clear();
        for &id in &self.order {
            let facility = &self.facilities[id];
            if facility.is_under_construction() {
                self.schedule.insert(facility.remaining_build_seconds(), id);
            }
        }
    }

    // -- Helpers --

    fn facility_type(&self, type_id: FacilityTypeId) -> &FacilityType {
        lookup(self.catalog.as_ref(), type_id)
    }

    fn index_of(&self, id: FacilityId) -> usize {
        match self.order.iter().position(|&f| f == id) {
            Some(index) => index,
            None => panic!("facility {id:?} is not on this floorplan"),
        }
    }

    /// Footprint snapshot in placement order.
    pub(crate) fn placed_footprints(&self) -> Vec<PlacedFootprint> {
        self.order
            .iter()
            .map(|&id| {
                let facility = &self.facilities[id];
                PlacedFootprint::new(
                    facility.position(),
                    self.facility_type(facility.type_id()).footprint(),
                    facility.is_under_construction(),
                )
            })
            .collect()
    }
}

/// Catalog lookup for ids that must exist.
fn lookup(catalog: &dyn FacilityCatalog, type_id: FacilityTypeId) -> &FacilityType {
    match catalog.facility_type(type_id) {
        Some(ty) => ty,
        None => panic!("facility type {type_id:?} is not in the catalog"),
    }
}
