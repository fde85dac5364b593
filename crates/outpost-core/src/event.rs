//! Floorplan events, buffered for the UI layer.
//!
//! The floorplan records what happened during each call. Callers drain the
//! buffer with [`crate::floorplan::Floorplan::drain_events`] after mutating
//! or ticking, typically to show "construction finished" notices.

use crate::grid::GridPosition;
use crate::id::{FacilityId, FacilityTypeId};

#[derive(Debug, Clone, PartialEq)]
pub enum FloorplanEvent {
    FacilityAdded {
        facility: FacilityId,
        type_id: FacilityTypeId,
        position: GridPosition,
    },
    FacilityRemoved {
        facility: FacilityId,
        type_id: FacilityTypeId,
        was_complete: bool,
    },
    ConstructionCompleted {
        facility: FacilityId,
        type_id: FacilityTypeId,
    },
}

impl FloorplanEvent {
    /// The facility the event is about.
    pub fn facility(&self) -> FacilityId {
        match self {
            FloorplanEvent::FacilityAdded { facility, .. }
            | FloorplanEvent::FacilityRemoved { facility, .. }
            | FloorplanEvent::ConstructionCompleted { facility, .. } => *facility,
        }
    }
}
