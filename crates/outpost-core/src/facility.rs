use crate::grid::GridPosition;
use crate::id::FacilityTypeId;
use serde::{Deserialize, Serialize};

/// One facility on a base, or a candidate being positioned before placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityInstance {
    type_id: FacilityTypeId,
    position: GridPosition,
    remaining_build_seconds: f64,
}

impl FacilityInstance {
    /// A placement candidate. Build time is assigned when it is added to a
    /// floorplan.
    pub fn new(type_id: FacilityTypeId, position: GridPosition) -> Self {
        Self {
            type_id,
            position,
            remaining_build_seconds: 0.0,
        }
    }

    pub fn type_id(&self) -> FacilityTypeId {
        self.type_id
    }

    /// Top-left cell.
    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn x(&self) -> i32 {
        self.position.x
    }

    pub fn y(&self) -> i32 {
        self.position.y
    }

    /// Move the candidate while it is being positioned.
    pub fn set_position(&mut self, position: GridPosition) {
        self.position = position;
    }

    pub fn remaining_build_seconds(&self) -> f64 {
        self.remaining_build_seconds
    }

    pub fn is_under_construction(&self) -> bool {
        self.remaining_build_seconds > 0.0
    }

    pub(crate) fn start_construction(&mut self, seconds: f64) {
        self.remaining_build_seconds = seconds;
    }

    pub(crate) fn advance(&mut self, seconds: f64) {
        self.remaining_build_seconds -= seconds;
    }

    pub(crate) fn complete(&mut self) {
        self.remaining_build_seconds = 0.0;
    }
}
